use chrono::{Datelike, Local};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{
    load_config, load_contacts, load_items, load_state, load_templates, resolve_output_dir,
    save_state, Config, Contact, HistoryEntry, Item, Organization, State,
};
use crate::error::{DossierError, Result};
use crate::layout::PageLayout;
use crate::pdf::generate_pdf;

use super::{
    calculate_totals_with, parse_item_input, render_html, DocumentKind, DocumentStatus,
    DocumentTemplate,
    InvoiceTotals, LineItem, LineItemEdit, LineItems, RenderContext, TemplateFilter,
    TemplateSelection,
};

const DATE_FORMAT: &str = "%d-%m-%Y";

/// Complete document data for PDF generation
#[derive(Debug, Serialize)]
pub struct DocumentData {
    pub title: String,
    pub number: String,
    pub date: String,
    pub due_label: String,
    pub due_date: String,
    pub organization: Organization,
    pub contact: Contact,
    pub country: String,
    pub items: Vec<LineItem>,
    pub totals: InvoiceTotals,
    pub currency_symbol: String,
    pub terms: String,
    pub notes: Option<String>,
    pub layout: PageLayout,
}

/// Everything needed to issue a new invoice or quote.
#[derive(Debug, Clone)]
pub struct DocumentRequest<'a> {
    pub kind: DocumentKind,
    pub contact: &'a str,
    /// Catalog inputs like "consult:2".
    pub items: &'a [String],
    /// Explicit template id; otherwise the default is resolved.
    pub template: Option<&'a str>,
    /// Select among templates carrying this tag instead of by type.
    pub tag: Option<&'a str>,
    pub output: Option<PathBuf>,
    pub pdf: bool,
}

/// Outcome of writing a document.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub number: String,
    pub kind: DocumentKind,
    pub contact: String,
    pub template: String,
    pub totals: InvoiceTotals,
    pub html_path: PathBuf,
    pub pdf_path: Option<PathBuf>,
}

/// Format a document number from template
pub fn format_document_number(format: &str, year: u32, seq: u32) -> String {
    format
        .replace("{year}", &year.to_string())
        .replace("{seq:03}", &format!("{:03}", seq))
        .replace("{seq:04}", &format!("{:04}", seq))
        .replace("{seq:05}", &format!("{:05}", seq))
}

/// File name stem for a document number. Path separators and other
/// characters most filesystems reject become `-`.
pub fn document_file_stem(number: &str) -> String {
    let stem: String = number
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    if stem.trim_matches('.').is_empty() {
        "document".to_string()
    } else {
        stem
    }
}

fn number_format(config: &Config, kind: DocumentKind) -> &str {
    match kind {
        DocumentKind::Invoice => &config.invoice.number_format,
        DocumentKind::Quote => &config.quote.number_format,
    }
}

/// Number the next document of `kind` issued this year would get.
pub fn next_document_number(config: &Config, state: &State, kind: DocumentKind) -> String {
    let year = Local::now().year() as u32;
    let seq = state.counters.for_kind(kind).next_seq(year);
    format_document_number(number_format(config, kind), year, seq)
}

/// Config, contacts, catalog and templates loaded together.
struct Workspace {
    dir: PathBuf,
    config: Config,
    contacts: HashMap<String, Contact>,
    catalog: HashMap<String, Item>,
    templates: Vec<DocumentTemplate>,
}

impl Workspace {
    fn load(cfg_dir: &Path) -> Result<Self> {
        Ok(Self {
            dir: cfg_dir.to_path_buf(),
            config: load_config(cfg_dir)?,
            contacts: load_contacts(cfg_dir)?,
            catalog: load_items(cfg_dir)?,
            templates: load_templates(cfg_dir)?,
        })
    }

    fn contact(&self, id: &str) -> Result<&Contact> {
        self.contacts
            .get(id)
            .ok_or_else(|| DossierError::ContactNotFound(id.to_string()))
    }

    fn build_lines(&self, inputs: &[String], kind: DocumentKind) -> Result<LineItems> {
        let mut lines = LineItems::new(kind.removal_policy());
        for input in inputs {
            let (item_id, quantity) = parse_item_input(input)?;
            let item = self
                .catalog
                .get(item_id)
                .ok_or_else(|| DossierError::ItemNotFound(item_id.to_string()))?;
            lines.add_item(LineItem::from_catalog(
                item,
                quantity,
                self.config.invoice.default_vat_rate,
            ));
        }
        Ok(lines)
    }

    fn totals(&self, items: &[LineItem]) -> InvoiceTotals {
        let totals = calculate_totals_with(items, self.config.invoice.vat_display);
        tracing::debug!(
            subtotal = totals.subtotal,
            vat = totals.vat_amount,
            total = totals.total,
            "calculated totals"
        );
        totals
    }

    fn due_days(&self, kind: DocumentKind) -> u32 {
        match kind {
            DocumentKind::Invoice => self.config.invoice.payment_terms,
            DocumentKind::Quote => self.config.quote.validity_days,
        }
    }

    fn default_notes(&self, kind: DocumentKind) -> Option<String> {
        match kind {
            DocumentKind::Invoice => self.config.invoice.notes.clone(),
            DocumentKind::Quote => self.config.quote.notes.clone(),
        }
    }

    /// Resolve the template for a document. A preferred id that is no longer
    /// available is an error when `strict`, otherwise the default is used.
    fn select_template(
        &self,
        kind: DocumentKind,
        preferred: Option<&str>,
        tag: Option<&str>,
        strict: bool,
    ) -> Result<&DocumentTemplate> {
        let filter = match tag {
            Some(tag) => TemplateFilter::Tag(tag.to_string()),
            None => TemplateFilter::Type(kind.template_type().to_string()),
        };

        let mut selection = TemplateSelection::new();
        if let Some(id) = preferred {
            if !selection.choose(&self.templates, &filter, id) {
                if strict {
                    return Err(DossierError::TemplateNotFound(id.to_string()));
                }
                tracing::warn!(template = id, "stored template no longer available, using default");
            }
        }

        selection
            .refresh(&self.templates, &filter, kind.template_type())
            .ok_or_else(|| DossierError::NoTemplate(kind.template_type().to_string()))
    }

    fn output_dir(&self) -> Result<PathBuf> {
        let dir = resolve_output_dir(&self.config.pdf.output_dir, &self.dir);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn document_data(&self, entry: &HistoryEntry, contact: &Contact, country: &str) -> DocumentData {
        let (due_label, terms) = match entry.kind {
            DocumentKind::Invoice => (
                "Vervaldatum",
                format!("Betaling binnen {} dagen", self.config.invoice.payment_terms),
            ),
            DocumentKind::Quote => (
                "Geldig tot",
                format!("Geldig tot {}", entry.due_date.format(DATE_FORMAT)),
            ),
        };

        DocumentData {
            title: entry.kind.title().to_string(),
            number: entry.number.clone(),
            date: entry.date.format(DATE_FORMAT).to_string(),
            due_label: due_label.to_string(),
            due_date: entry.due_date.format(DATE_FORMAT).to_string(),
            organization: self.config.organization.clone(),
            contact: contact.clone(),
            country: country.to_string(),
            items: entry.items.clone(),
            totals: entry.totals,
            currency_symbol: self.config.invoice.currency_symbol.clone(),
            terms,
            notes: entry.notes.clone(),
            layout: PageLayout::from_settings(&self.config.layout),
        }
    }

    /// Render the HTML and, when enabled, the PDF for `entry`.
    fn write(
        &self,
        entry: &HistoryEntry,
        template: &DocumentTemplate,
        output: Option<PathBuf>,
        pdf: bool,
    ) -> Result<(PathBuf, Option<PathBuf>)> {
        let org = &self.config.organization;
        let contact = self.contact(&entry.contact)?;
        let country = contact.country.as_deref().unwrap_or(&org.country);
        let date = entry.date.format(DATE_FORMAT).to_string();
        let due_date = entry.due_date.format(DATE_FORMAT).to_string();

        let ctx = RenderContext {
            number: &entry.number,
            company_name: &org.name,
            client_name: Some(contact.name.as_str()),
            client_email: contact.email.as_deref(),
            client_address: contact.address.as_deref(),
            client_postal_code: contact.postal_code.as_deref(),
            client_city: contact.city.as_deref(),
            client_country: Some(country),
            date: &date,
            due_date: &due_date,
            payment_terms: self.due_days(entry.kind),
            notes: entry.notes.as_deref(),
            currency_symbol: &self.config.invoice.currency_symbol,
            items: &entry.items,
            totals: entry.totals,
        };

        let output_dir = self.output_dir()?;
        let stem = document_file_stem(&entry.number);
        let html_path = output_dir.join(format!("{stem}.html"));
        fs::write(&html_path, render_html(&template.html_content, &ctx))?;
        tracing::info!(path = %html_path.display(), template = %template.id, "wrote html");

        let pdf_path = if pdf && self.config.pdf.enabled {
            let path = output.unwrap_or_else(|| output_dir.join(format!("{stem}.pdf")));
            generate_pdf(&self.document_data(entry, contact, country), &path)?;
            tracing::info!(path = %path.display(), "wrote pdf");
            Some(path)
        } else {
            None
        };

        Ok((html_path, pdf_path))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Number, write and record a new document. The caller saves the state.
fn issue(
    ws: &Workspace,
    state: &mut State,
    mut entry: HistoryEntry,
    template: &DocumentTemplate,
    output: Option<PathBuf>,
    pdf: bool,
) -> Result<GeneratedDocument> {
    let year = Local::now().year() as u32;
    let seq = state.counters.for_kind(entry.kind).next_seq(year);
    entry.number = format_document_number(number_format(&ws.config, entry.kind), year, seq);
    entry.template = Some(template.id.clone());

    let (html_path, pdf_path) = ws.write(&entry, template, output, pdf)?;
    entry.file = file_name(&html_path);
    entry.pdf = pdf_path.as_ref().map(|p| p.to_string_lossy().into_owned());

    state.counters.for_kind_mut(entry.kind).advance(year, seq);
    state.record(
        "generate",
        &entry.number,
        format!(
            "{} for {}, {} line(s), total {:.2}",
            entry.kind,
            entry.contact,
            entry.items.len(),
            entry.totals.total
        ),
    );

    let generated = GeneratedDocument {
        number: entry.number.clone(),
        kind: entry.kind,
        contact: entry.contact.clone(),
        template: template.id.clone(),
        totals: entry.totals,
        html_path,
        pdf_path,
    };
    state.history.push(entry);
    Ok(generated)
}

/// Generate a new invoice or quote
pub fn generate_document(cfg_dir: &Path, request: DocumentRequest<'_>) -> Result<GeneratedDocument> {
    if request.items.is_empty() {
        return Err(DossierError::NoItems);
    }

    let ws = Workspace::load(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    ws.contact(request.contact)?;
    let items = ws.build_lines(request.items, request.kind)?.into_vec();
    let template = ws.select_template(request.kind, request.template, request.tag, true)?;

    let today = Local::now().date_naive();
    let due_date = today
        .checked_add_signed(chrono::Duration::days(ws.due_days(request.kind) as i64))
        .unwrap_or(today);

    let entry = HistoryEntry {
        number: String::new(),
        kind: request.kind,
        contact: request.contact.to_string(),
        date: today,
        due_date,
        template: None,
        template_tag: request.tag.map(str::to_string),
        file: String::new(),
        pdf: None,
        notes: ws.default_notes(request.kind),
        status: DocumentStatus::Draft,
        converted_from: None,
        converted_to: None,
        totals: ws.totals(&items),
        items,
    };

    let generated = issue(&ws, &mut state, entry, template, request.output, request.pdf)?;
    save_state(cfg_dir, &state)?;
    Ok(generated)
}

fn history_index(state: &State, number: &str) -> Result<usize> {
    state
        .history
        .iter()
        .position(|e| e.number == number)
        .ok_or_else(|| DossierError::DocumentNotFound(number.to_string()))
}

/// Replace a stored document's lines, re-render it and save the state.
fn rewrite(
    ws: &Workspace,
    state: &mut State,
    idx: usize,
    items: Vec<LineItem>,
    action: &str,
    pdf: bool,
) -> Result<GeneratedDocument> {
    let mut entry = state.history[idx].clone();
    let template = ws.select_template(
        entry.kind,
        entry.template.as_deref(),
        entry.template_tag.as_deref(),
        false,
    )?;

    entry.totals = ws.totals(&items);
    entry.items = items;
    entry.template = Some(template.id.clone());

    let (html_path, pdf_path) = ws.write(&entry, template, None, pdf)?;
    entry.file = file_name(&html_path);
    if let Some(path) = &pdf_path {
        entry.pdf = Some(path.to_string_lossy().into_owned());
    }

    state.record(
        action,
        &entry.number,
        format!("{} line(s), total {:.2}", entry.items.len(), entry.totals.total),
    );

    let generated = GeneratedDocument {
        number: entry.number.clone(),
        kind: entry.kind,
        contact: entry.contact.clone(),
        template: template.id.clone(),
        totals: entry.totals,
        html_path,
        pdf_path,
    };
    state.history[idx] = entry;
    save_state(&ws.dir, state)?;
    Ok(generated)
}

/// Regenerate an existing document, optionally replacing its lines
pub fn regenerate_document(
    cfg_dir: &Path,
    number: &str,
    new_items: Option<&[String]>,
    pdf: bool,
) -> Result<GeneratedDocument> {
    let ws = Workspace::load(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    let idx = history_index(&state, number)?;
    let kind = state.history[idx].kind;

    let (items, action) = match new_items {
        Some(inputs) => {
            if inputs.is_empty() {
                return Err(DossierError::NoItems);
            }
            (ws.build_lines(inputs, kind)?.into_vec(), "edit")
        }
        None => (state.history[idx].items.clone(), "regenerate"),
    };

    rewrite(&ws, &mut state, idx, items, action, pdf)
}

/// Append catalog lines to a stored document
pub fn add_lines(cfg_dir: &Path, number: &str, inputs: &[String], pdf: bool) -> Result<GeneratedDocument> {
    if inputs.is_empty() {
        return Err(DossierError::NoItems);
    }

    let ws = Workspace::load(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    let idx = history_index(&state, number)?;
    let kind = state.history[idx].kind;

    let mut lines = LineItems::from_items(state.history[idx].items.clone(), kind.removal_policy());
    for item in ws.build_lines(inputs, kind)?.into_vec() {
        lines.add_item(item);
    }

    rewrite(&ws, &mut state, idx, lines.into_vec(), "add-line", pdf)
}

fn line_index(entry: &HistoryEntry, index: usize) -> Result<usize> {
    if index == 0 || index > entry.items.len() {
        return Err(DossierError::InvalidLineIndex {
            document: entry.number.clone(),
            index,
            count: entry.items.len(),
        });
    }
    Ok(index - 1)
}

/// Apply field edits to one line (1-based) of a stored document
pub fn update_line(
    cfg_dir: &Path,
    number: &str,
    index: usize,
    edits: Vec<LineItemEdit>,
    pdf: bool,
) -> Result<GeneratedDocument> {
    let ws = Workspace::load(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    let idx = history_index(&state, number)?;
    let entry = &state.history[idx];
    let line = line_index(entry, index)?;

    let label = format!("{} line {}", entry.number, index);
    for edit in &edits {
        edit.validate(&label)?;
    }

    let mut lines = LineItems::from_items(entry.items.clone(), entry.kind.removal_policy());
    for edit in edits {
        lines.update(line, edit);
    }

    rewrite(&ws, &mut state, idx, lines.into_vec(), "update-line", pdf)
}

/// Remove one line (1-based) from a stored document. Quotes keep their last line.
pub fn remove_line(
    cfg_dir: &Path,
    number: &str,
    index: usize,
    pdf: bool,
) -> Result<(LineItem, GeneratedDocument)> {
    let ws = Workspace::load(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    let idx = history_index(&state, number)?;
    let entry = &state.history[idx];
    let line = line_index(entry, index)?;

    let mut lines = LineItems::from_items(entry.items.clone(), entry.kind.removal_policy());
    let removed = lines
        .remove(line)
        .ok_or_else(|| DossierError::LastQuoteLine(number.to_string()))?;

    let generated = rewrite(&ws, &mut state, idx, lines.into_vec(), "remove-line", pdf)?;
    Ok((removed, generated))
}

/// Turn a stored quote into a new invoice carrying the same lines
pub fn convert_quote(cfg_dir: &Path, quote_number: &str, pdf: bool) -> Result<GeneratedDocument> {
    let ws = Workspace::load(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let quote = state
        .find(quote_number)
        .cloned()
        .ok_or_else(|| DossierError::DocumentNotFound(quote_number.to_string()))?;

    if quote.kind != DocumentKind::Quote {
        return Err(DossierError::NotAQuote(quote_number.to_string()));
    }
    if let Some(invoice) = quote.converted_to {
        return Err(DossierError::AlreadyConverted {
            quote: quote_number.to_string(),
            invoice,
        });
    }

    let template = ws.select_template(DocumentKind::Invoice, None, None, true)?;
    let entry = HistoryEntry {
        number: String::new(),
        kind: DocumentKind::Invoice,
        contact: quote.contact,
        date: quote.date,
        due_date: quote.due_date,
        template: None,
        template_tag: None,
        file: String::new(),
        pdf: None,
        notes: ws.default_notes(DocumentKind::Invoice),
        status: DocumentStatus::Draft,
        converted_from: Some(quote.number.clone()),
        converted_to: None,
        totals: ws.totals(&quote.items),
        items: quote.items,
    };

    let generated = issue(&ws, &mut state, entry, template, None, pdf)?;

    if let Some(stored) = state.find_mut(quote_number) {
        stored.converted_to = Some(generated.number.clone());
        stored.status = DocumentStatus::Accepted;
    }
    state.record("convert", quote_number, format!("converted to {}", generated.number));
    save_state(cfg_dir, &state)?;

    Ok(generated)
}

/// Move a stored document to `status`. Returns the status it had before.
///
/// `overdue` and `expired` follow from the due date and cannot be set.
pub fn set_status(cfg_dir: &Path, number: &str, status: DocumentStatus) -> Result<DocumentStatus> {
    let mut state = load_state(cfg_dir)?;
    let entry = state
        .find_mut(number)
        .ok_or_else(|| DossierError::DocumentNotFound(number.to_string()))?;

    if !status.can_set_on(entry.kind) {
        return Err(DossierError::InvalidStatus {
            document: number.to_string(),
            kind: entry.kind.to_string(),
            status: status.to_string(),
        });
    }

    let previous = std::mem::replace(&mut entry.status, status);
    if previous != status {
        state.record("set-status", number, format!("{previous} -> {status}"));
        save_state(cfg_dir, &state)?;
    }
    Ok(previous)
}

/// Path of a document's PDF, or its HTML when no PDF was generated
pub fn get_document_path(cfg_dir: &Path, number: &str) -> Result<PathBuf> {
    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let entry = state
        .find(number)
        .ok_or_else(|| DossierError::DocumentNotFound(number.to_string()))?;

    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    let path = match &entry.pdf {
        Some(pdf) => {
            let pdf = PathBuf::from(pdf);
            if pdf.is_absolute() {
                pdf
            } else {
                output_dir.join(pdf)
            }
        }
        None => output_dir.join(&entry.file),
    };

    if !path.exists() {
        return Err(DossierError::DocumentFileNotFound(path));
    }

    Ok(path)
}
