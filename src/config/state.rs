use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{DocumentKind, DocumentStatus, InvoiceTotals, LineItem};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    #[serde(default)]
    pub counters: Counters,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub audit: Vec<AuditEntry>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Counters {
    #[serde(default)]
    pub invoice: Counter,
    #[serde(default)]
    pub quote: Counter,
}

impl Counters {
    pub fn for_kind(&self, kind: DocumentKind) -> &Counter {
        match kind {
            DocumentKind::Invoice => &self.invoice,
            DocumentKind::Quote => &self.quote,
        }
    }

    pub fn for_kind_mut(&mut self, kind: DocumentKind) -> &mut Counter {
        match kind {
            DocumentKind::Invoice => &mut self.invoice,
            DocumentKind::Quote => &mut self.quote,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Counter {
    pub last_number: u32,
    pub last_year: u32,
}

impl Default for Counter {
    fn default() -> Self {
        Self {
            last_number: 0,
            last_year: Utc::now().year() as u32,
        }
    }
}

impl Counter {
    /// Sequence number the next document in `year` gets. Resets every year.
    pub fn next_seq(&self, year: u32) -> u32 {
        if self.last_year == year {
            self.last_number + 1
        } else {
            1
        }
    }

    pub fn advance(&mut self, year: u32, seq: u32) {
        self.last_number = seq;
        self.last_year = year;
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HistoryEntry {
    pub number: String,
    pub kind: DocumentKind,
    pub contact: String,
    pub date: NaiveDate,
    /// Due date for invoices, valid-until date for quotes.
    pub due_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Tag the template was chosen by; re-renders filter on it again.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_tag: Option<String>,
    /// Rendered HTML file name, relative to the output directory.
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_to: Option<String>,
    pub totals: InvoiceTotals,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// One line of the audit trail kept in state.toml.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub action: String,
    pub document: String,
    #[serde(default)]
    pub detail: String,
}

impl State {
    pub fn find(&self, number: &str) -> Option<&HistoryEntry> {
        self.history.iter().find(|e| e.number == number)
    }

    pub fn find_mut(&mut self, number: &str) -> Option<&mut HistoryEntry> {
        self.history.iter_mut().find(|e| e.number == number)
    }

    pub fn record(&mut self, action: &str, document: &str, detail: impl Into<String>) {
        let entry = AuditEntry {
            at: Utc::now(),
            action: action.to_string(),
            document: document.to_string(),
            detail: detail.into(),
        };
        tracing::debug!(action, document, detail = %entry.detail, "audit");
        self.audit.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_resets_on_new_year() {
        let counter = Counter {
            last_number: 41,
            last_year: 2025,
        };
        assert_eq!(counter.next_seq(2025), 42);
        assert_eq!(counter.next_seq(2026), 1);
    }

    #[test]
    fn state_round_trips_through_toml() {
        let mut state = State::default();
        state.counters.quote.advance(2026, 3);
        state.history.push(HistoryEntry {
            number: "OFF-2026-003".to_string(),
            kind: DocumentKind::Quote,
            contact: "acme".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            template: Some("offerte-standaard".to_string()),
            template_tag: Some("Offerte".to_string()),
            file: "OFF-2026-003.html".to_string(),
            pdf: None,
            notes: None,
            status: DocumentStatus::Sent,
            converted_from: None,
            converted_to: None,
            totals: InvoiceTotals {
                subtotal: 100.0,
                vat_amount: 21.0,
                total: 121.0,
            },
            items: vec![LineItem::new("Advies", 1.0, 100.0, 21.0)],
        });
        state.record("generate", "OFF-2026-003", "1 line");

        let text = toml::to_string_pretty(&state).unwrap();
        let parsed: State = toml::from_str(&text).unwrap();

        assert_eq!(parsed.counters.quote.last_number, 3);
        let entry = parsed.find("OFF-2026-003").unwrap();
        assert_eq!(entry.kind, DocumentKind::Quote);
        assert_eq!(entry.items.len(), 1);
        assert_eq!(entry.status, DocumentStatus::Sent);
        assert_eq!(entry.template_tag.as_deref(), Some("Offerte"));
        assert_eq!(entry.items[0].line_total, 100.0);
        assert_eq!(parsed.audit.len(), 1);
        assert_eq!(parsed.audit[0].action, "generate");
    }

    #[test]
    fn entries_without_status_load_as_draft() {
        let text = r#"
[[history]]
number = "2026-001"
kind = "invoice"
contact = "jansen"
date = "2026-03-01"
due_date = "2026-03-31"
file = "2026-001.html"

[history.totals]
subtotal = 0.0
vat_amount = 0.0
total = 0.0
"#;
        let state: State = toml::from_str(text).unwrap();
        let entry = state.find("2026-001").unwrap();
        assert_eq!(entry.status, DocumentStatus::Draft);
        assert!(entry.template_tag.is_none());
    }
}
