use serde::{Deserialize, Serialize};
use std::fmt;

use super::RemovalPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Invoice,
    Quote,
}

impl DocumentKind {
    /// Template type documents of this kind are rendered with.
    pub fn template_type(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "factuur",
            DocumentKind::Quote => "offerte",
        }
    }

    /// Heading printed on the document.
    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "FACTUUR",
            DocumentKind::Quote => "OFFERTE",
        }
    }

    /// A quote must always keep one line; an invoice may be emptied.
    pub fn removal_policy(self) -> RemovalPolicy {
        match self {
            DocumentKind::Invoice => RemovalPolicy::AllowEmpty,
            DocumentKind::Quote => RemovalPolicy::KeepOne,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Invoice => write!(f, "invoice"),
            DocumentKind::Quote => write!(f, "quote"),
        }
    }
}
