use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DossierError {
    #[error("Config directory not found at {0}. Run 'dossier init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write {path}: {reason}")]
    ConfigWrite { path: PathBuf, reason: String },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Contact '{0}' not found in contacts.toml")]
    ContactNotFound(String),

    #[error("Item '{0}' not found in items.toml")]
    ItemNotFound(String),

    #[error("Invalid quantity '{qty}' for item '{item}': {reason}")]
    InvalidQuantity {
        item: String,
        qty: String,
        reason: String,
    },

    #[error("Invalid unit price '{price}' for item '{item}': must be a finite number")]
    InvalidUnitPrice { item: String, price: f64 },

    #[error("Invalid VAT rate '{rate}' for item '{item}': must be between 0 and 100")]
    InvalidVatRate { item: String, rate: f64 },

    #[error("Invalid item format '{0}'. Expected 'item:quantity' (e.g., 'consulting:8')")]
    InvalidItemFormat(String),

    #[error("No items specified. Use --item <name>:<quantity> to add line items.")]
    NoItems,

    #[error("Template '{0}' not found in templates.toml")]
    TemplateNotFound(String),

    #[error("Template file for '{id}' not found: {path}")]
    TemplateFileNotFound { id: String, path: PathBuf },

    #[error("No active {0} template available. Add one to templates.toml.")]
    NoTemplate(String),

    #[error("Document '{0}' not found in history")]
    DocumentNotFound(String),

    #[error("Invalid document index '{0}'. Use 'dossier list' to see available documents.")]
    InvalidDocumentIndex(String),

    #[error("Invalid line {index} for {document} (it has {count} line(s))")]
    InvalidLineIndex {
        document: String,
        index: usize,
        count: usize,
    },

    #[error("Quote {0} must keep at least one line")]
    LastQuoteLine(String),

    #[error("{0} is not a quote")]
    NotAQuote(String),

    #[error("Quote {quote} was already converted to {invoice}")]
    AlreadyConverted { quote: String, invoice: String },

    #[error("Status '{status}' cannot be set on {kind} {document}")]
    InvalidStatus {
        document: String,
        kind: String,
        status: String,
    },

    #[error("Document file not found: {0}")]
    DocumentFileNotFound(PathBuf),

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DossierError>;
