mod contact;
mod item;
mod organization;
pub mod state;
mod template;

pub use contact::Contact;
pub use item::Item;
pub use organization::{
    Config, InvoiceSettings, LayoutSettings, Organization, PdfSettings, QuoteSettings,
};
pub use state::{AuditEntry, HistoryEntry, State};
pub use template::TemplateEntry;

use crate::document::DocumentTemplate;
use crate::error::{DossierError, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, or ~/.dossier/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "dossier") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        DossierError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".dossier"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the configured output directory. Relative paths are taken
/// relative to the config directory.
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let path = expand_path(output_dir);
    if path.is_absolute() {
        path
    } else {
        config_dir.join(path)
    }
}

fn load_toml<T: DeserializeOwned>(path: PathBuf) -> Result<T> {
    if !path.exists() {
        return Err(DossierError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DossierError::ConfigParse { path, source: e })
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    load_toml(config_dir.join("config.toml"))
}

/// Load contacts.toml as a HashMap
pub fn load_contacts(config_dir: &Path) -> Result<HashMap<String, Contact>> {
    load_toml(config_dir.join("contacts.toml"))
}

/// Load items.toml as a HashMap
pub fn load_items(config_dir: &Path) -> Result<HashMap<String, Item>> {
    load_toml(config_dir.join("items.toml"))
}

/// Load templates.toml and read every registered HTML file.
pub fn load_templates(config_dir: &Path) -> Result<Vec<DocumentTemplate>> {
    let entries: HashMap<String, TemplateEntry> = load_toml(config_dir.join("templates.toml"))?;
    let template_dir = config_dir.join("templates");

    let mut templates = Vec::with_capacity(entries.len());
    for (id, entry) in entries {
        let path = template_dir.join(&entry.file);
        if !path.exists() {
            return Err(DossierError::TemplateFileNotFound { id, path });
        }
        let html_content = fs::read_to_string(&path)?;
        templates.push(DocumentTemplate {
            id,
            name: entry.name,
            doc_type: entry.doc_type,
            html_content,
            is_default: entry.is_default,
            is_active: entry.is_active,
            created_at: entry.created_at,
            tags: entry.tags,
        });
    }

    // HashMap order is arbitrary; keep listings and first-item fallbacks stable
    templates.sort_by(|a, b| a.id.cmp(&b.id));
    tracing::debug!(count = templates.len(), "loaded templates");
    Ok(templates)
}

/// Load state.toml (creates default if missing)
pub fn load_state(config_dir: &Path) -> Result<State> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(State::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DossierError::ConfigParse { path, source: e })
}

/// Save state.toml
pub fn save_state(config_dir: &Path, state: &State) -> Result<()> {
    let path = config_dir.join("state.toml");
    let content = toml::to_string_pretty(state).map_err(|e| DossierError::ConfigWrite {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[organization]
name = "Uw Kantoor B.V."
address = "Keizersgracht 1"
postal_code = "1015 AA"
city = "Amsterdam"
country = "Nederland"
email = "administratie@uwkantoor.nl"
# phone = "+31 20 123 4567"       # optional
# vat_number = "NL123456789B01"   # optional
# coc_number = "12345678"         # optional
# iban = "NL00BANK0123456789"     # optional

[invoice]
number_format = "{year}-{seq:03}"   # e.g., 2026-001
currency_symbol = "€"
payment_terms = 30                  # days until the due date
default_vat_rate = 21.0             # percentage
vat_display = "exclusive"           # "exclusive" or "inclusive" prices
# notes = "Gelieve binnen de termijn te betalen."

[quote]
number_format = "OFF-{year}-{seq:03}"
validity_days = 30
notes = "Deze offerte is geldig tot de genoemde datum. Na acceptatie wordt deze offerte omgezet naar een factuur."

[layout]
padding_px = 60.0
header_height_px = 100.0
content_spacing_px = 16.0
font_size_px = 12.0

[pdf]
output_dir = "output"   # relative to this directory, or an absolute/~ path
enabled = true          # set to false to only write rendered HTML
"#;

/// Template content for contacts.toml
pub const CONTACTS_TEMPLATE: &str = r#"# Define your contacts here. The table name (e.g., [jansen]) is used
# as the contact identifier in the invoice and quote commands.
#
# Example:
#   dossier invoice --contact jansen --item consult:2

[jansen]
name = "Jansen Holding B.V."
contact_person = "M. Jansen"       # optional
email = "m.jansen@example.nl"
address = "Stationsplein 12"
postal_code = "3511 ED"
city = "Utrecht"
# country = "Nederland"            # optional, defaults to organization country
# dossier = "2026/0042"            # optional case file reference
"#;

/// Template content for items.toml
pub const ITEMS_TEMPLATE: &str = r#"# Define your catalog here. The table name (e.g., [consult]) is used
# as the item identifier when adding line items.
#
# Example:
#   dossier invoice --contact jansen --item consult:2 --item griffierecht:1

[consult]
description = "Juridisch advies"
unit_price = 195.00
unit = "uur"

[dossierbehandeling]
description = "Dossierbehandeling"
unit_price = 150.00
unit = "uur"

[griffierecht]
description = "Griffierecht"
unit_price = 320.00
unit = "vast"
vat_rate = 0.0   # disbursements carry no VAT
"#;

/// Template content for templates.toml
pub const TEMPLATES_TEMPLATE: &str = r#"# Register document templates here. The table name is the template id.
# Templates are HTML files in the templates/ directory.
#
#   type        document type: factuur, offerte, brief, contract, custom
#   is_default  preferred template for its type
#   is_active   inactive templates are never selected
#   tags        labels used by tag filters (case-insensitive)

[factuur-standaard]
name = "Standaard factuur"
type = "factuur"
file = "factuur.html"
is_default = true
created_at = "2026-01-01T00:00:00Z"
tags = ["Factuur"]

[offerte-standaard]
name = "Standaard offerte"
type = "offerte"
file = "offerte.html"
is_default = true
created_at = "2026-01-01T00:00:00Z"
tags = ["Offerte"]
"#;

/// Starter HTML for invoices
pub const INVOICE_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="nl">
<head><meta charset="utf-8"><title>Factuur %INVOICE_NUMBER%</title></head>
<body style="font-family: Helvetica, Arial, sans-serif; font-size: 12px; line-height: 1.4;">
  <header style="height: 100px;">
    <h1>%COMPANY_NAME%</h1>
  </header>
  <h2>Factuur %INVOICE_NUMBER%</h2>
  <p>
    %CLIENT_NAME%<br>
    %CLIENT_ADDRESS%<br>
    %CLIENT_POSTAL_CODE% %CLIENT_CITY%<br>
    %CLIENT_COUNTRY%
  </p>
  <p>Factuurdatum: %INVOICE_DATE%<br>Vervaldatum: %DUE_DATE%<br>Betalingstermijn: %PAYMENT_TERMS% dagen</p>
  <table style="width: 100%; border-collapse: collapse;">
    <thead>
      <tr><th>Omschrijving</th><th>Aantal</th><th>Prijs</th><th>BTW</th><th>Totaal</th></tr>
    </thead>
    <tbody>%LINE_ITEMS%</tbody>
  </table>
  <p>Subtotaal: %SUBTOTAL%<br>BTW: %VAT_AMOUNT%<br><strong>Totaal: %TOTAL_AMOUNT%</strong></p>
  <p>%NOTES%</p>
</body>
</html>
"#;

/// Starter HTML for quotes
pub const QUOTE_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="nl">
<head><meta charset="utf-8"><title>Offerte %DOCUMENT_NUMBER%</title></head>
<body style="font-family: Helvetica, Arial, sans-serif; font-size: 12px; line-height: 1.4;">
  <header style="height: 100px;">
    <h1>%COMPANY_NAME%</h1>
  </header>
  <h2>Offerte %DOCUMENT_NUMBER%</h2>
  <p>
    %CLIENT_NAME%<br>
    %CLIENT_ADDRESS%<br>
    %CLIENT_POSTAL_CODE% %CLIENT_CITY%<br>
    %CLIENT_COUNTRY%
  </p>
  <p>Datum: %INVOICE_DATE%<br>Geldig tot: %DUE_DATE%</p>
  <table style="width: 100%; border-collapse: collapse;">
    <thead>
      <tr><th>Omschrijving</th><th>Aantal</th><th>Prijs</th><th>BTW</th><th>Totaal</th></tr>
    </thead>
    <tbody>%LINE_ITEMS%</tbody>
  </table>
  <p>Subtotaal: %SUBTOTAL%<br>BTW: %VAT_AMOUNT%<br><strong>Totaal: %TOTAL_AMOUNT%</strong></p>
  <p>%NOTES%</p>
</body>
</html>
"#;
