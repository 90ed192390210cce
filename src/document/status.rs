use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::DocumentKind;

/// Lifecycle of an issued document.
///
/// Invoices move through draft, sent, paid and cancelled. Quotes move
/// through draft, sent, accepted and rejected. `Overdue` and `Expired` are
/// never stored by hand: they follow from a sent document's due date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
    Accepted,
    Rejected,
    Expired,
}

impl DocumentStatus {
    /// Whether this status may be set explicitly on a document of `kind`.
    pub fn can_set_on(self, kind: DocumentKind) -> bool {
        use DocumentStatus::*;
        match kind {
            DocumentKind::Invoice => matches!(self, Draft | Sent | Paid | Cancelled),
            DocumentKind::Quote => matches!(self, Draft | Sent | Accepted | Rejected),
        }
    }

    /// Status as of `today`. A sent invoice past its due date is overdue,
    /// a sent quote past its validity date has expired.
    pub fn effective(self, kind: DocumentKind, due_date: NaiveDate, today: NaiveDate) -> Self {
        if self != DocumentStatus::Sent || due_date >= today {
            return self;
        }
        match kind {
            DocumentKind::Invoice => DocumentStatus::Overdue,
            DocumentKind::Quote => DocumentStatus::Expired,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Paid => "paid",
            DocumentStatus::Overdue => "overdue",
            DocumentStatus::Cancelled => "cancelled",
            DocumentStatus::Accepted => "accepted",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Expired => "expired",
        };
        f.write_str(name)
    }
}
