pub mod config;
pub mod document;
pub mod error;
pub mod layout;
pub mod pdf;

pub use config::{AuditEntry, Config, Contact, HistoryEntry, Item, Organization, State};
pub use document::{
    calculate_totals, filter_templates, generate_document, resolve_default, DocumentKind,
    DocumentStatus, DocumentTemplate, InvoiceTotals, LineItem, LineItems, TemplateFilter,
};
pub use error::{DossierError, Result};
pub use layout::{line_spacing_mm, px_to_mm};
