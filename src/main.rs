use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use dossier::config::{
    config_dir, load_config, load_contacts, load_items, load_state, load_templates,
    CONFIG_TEMPLATE, CONTACTS_TEMPLATE, INVOICE_HTML_TEMPLATE, ITEMS_TEMPLATE,
    QUOTE_HTML_TEMPLATE, TEMPLATES_TEMPLATE,
};
use dossier::document::{
    add_lines, convert_quote, filter_templates, format_money, generate_document,
    get_document_path, next_document_number, regenerate_document, remove_line, set_status,
    sorted_for_display, update_line, DocumentKind, DocumentRequest, DocumentStatus,
    GeneratedDocument, LineItemEdit, TemplateFilter, TemplateSelection,
};
use dossier::{DossierError, Result};

#[derive(Parser)]
#[command(name = "dossier")]
#[command(version, about = "Back-office CLI for invoices, quotes and document templates", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.dossier)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Invoice,
    Quote,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Invoice => DocumentKind::Invoice,
            KindArg::Quote => DocumentKind::Quote,
        }
    }
}

/// Statuses that can be set by hand; overdue and expired follow from the due date.
#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Draft,
    Sent,
    Paid,
    Cancelled,
    Accepted,
    Rejected,
}

impl From<StatusArg> for DocumentStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Draft => DocumentStatus::Draft,
            StatusArg::Sent => DocumentStatus::Sent,
            StatusArg::Paid => DocumentStatus::Paid,
            StatusArg::Cancelled => DocumentStatus::Cancelled,
            StatusArg::Accepted => DocumentStatus::Accepted,
            StatusArg::Rejected => DocumentStatus::Rejected,
        }
    }
}

#[derive(clap::Args)]
struct IssueArgs {
    /// Contact identifier from contacts.toml
    #[arg(short, long)]
    contact: String,

    /// Line items in format "item:quantity" (can be repeated)
    #[arg(short, long, value_name = "ITEM:QTY")]
    item: Vec<String>,

    /// Template id from templates.toml (default: resolved automatically)
    #[arg(short, long)]
    template: Option<String>,

    /// Choose among templates carrying this tag instead of by type
    #[arg(long, conflicts_with = "template")]
    tag: Option<String>,

    /// Custom PDF output path (default: output_dir/<number>.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only write the rendered HTML, skip the PDF
    #[arg(long)]
    no_pdf: bool,

    /// Open the generated document with the system default viewer
    #[arg(long)]
    open: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Generate a new invoice
    Invoice(IssueArgs),

    /// Generate a new quote
    Quote(IssueArgs),

    /// List configured contacts
    Contacts,

    /// List catalog items
    Items,

    /// List document templates and the one that would be selected
    Templates {
        /// Only templates of this type (e.g., factuur, offerte, brief)
        #[arg(long = "type", value_name = "TYPE")]
        doc_type: Option<String>,

        /// Only templates carrying this tag (case-insensitive)
        #[arg(long, conflicts_with = "doc_type")]
        tag: Option<String>,

        /// Document type to prefer when resolving the selection (default: --type)
        #[arg(long = "for", value_name = "TYPE")]
        for_type: Option<String>,
    },

    /// Show configuration summary and next document numbers
    Status,

    /// List generated documents
    List {
        /// Show only the N most recent documents
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only invoices or only quotes
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Replace a document's line items
    Edit {
        /// Document number or index from 'list' (e.g., 1 or 2026-001)
        document: String,

        /// New line items in format "item:quantity" (replaces existing items)
        #[arg(short, long, value_name = "ITEM:QTY")]
        item: Vec<String>,

        /// Only write the rendered HTML, skip the PDF
        #[arg(long)]
        no_pdf: bool,
    },

    /// Append line items to a document
    AddLine {
        /// Document number or index from 'list'
        document: String,

        /// Line items in format "item:quantity" (can be repeated)
        #[arg(short, long, value_name = "ITEM:QTY")]
        item: Vec<String>,

        /// Only write the rendered HTML, skip the PDF
        #[arg(long)]
        no_pdf: bool,
    },

    /// Change fields of one line item
    SetLine {
        /// Document number or index from 'list'
        document: String,

        /// 1-based line number
        line: usize,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        quantity: Option<f64>,

        /// Unit price
        #[arg(long)]
        price: Option<f64>,

        /// VAT rate in percent
        #[arg(long)]
        vat: Option<f64>,

        /// Only write the rendered HTML, skip the PDF
        #[arg(long)]
        no_pdf: bool,
    },

    /// Remove one line item (a quote always keeps at least one line)
    RemoveLine {
        /// Document number or index from 'list'
        document: String,

        /// 1-based line number
        line: usize,

        /// Only write the rendered HTML, skip the PDF
        #[arg(long)]
        no_pdf: bool,
    },

    /// Convert a quote into a new invoice
    Convert {
        /// Quote number or index from 'list'
        quote: String,

        /// Only write the rendered HTML, skip the PDF
        #[arg(long)]
        no_pdf: bool,

        /// Open the invoice with the system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Set the status of a document (invoices: draft, sent, paid, cancelled;
    /// quotes: draft, sent, accepted, rejected)
    SetStatus {
        /// Document number or index from 'list'
        document: String,

        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Re-render a document from stored data
    Regenerate {
        /// Document number or index from 'list'
        document: String,

        /// Only write the rendered HTML, skip the PDF
        #[arg(long)]
        no_pdf: bool,

        /// Open the regenerated document with the system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Open a document (PDF, or HTML when no PDF was generated)
    Open {
        /// Document number or index from 'list'
        document: String,
    },

    /// Show the audit history
    History {
        /// Show only the N most recent entries
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only entries for this document number
        #[arg(short, long)]
        document: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dossier=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };
    tracing::debug!(config_dir = %cfg_dir.display(), "using config directory");

    if !matches!(cli.command, Commands::Init) && !cfg_dir.exists() {
        return Err(DossierError::ConfigNotFound(cfg_dir));
    }

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Invoice(args) => cmd_issue(&cfg_dir, DocumentKind::Invoice, args),
        Commands::Quote(args) => cmd_issue(&cfg_dir, DocumentKind::Quote, args),
        Commands::Contacts => cmd_contacts(&cfg_dir),
        Commands::Items => cmd_items(&cfg_dir),
        Commands::Templates {
            doc_type,
            tag,
            for_type,
        } => cmd_templates(&cfg_dir, doc_type, tag, for_type),
        Commands::Status => cmd_status(&cfg_dir),
        Commands::List { limit, kind } => cmd_list(&cfg_dir, limit, kind.map(Into::into)),
        Commands::Edit {
            document,
            item,
            no_pdf,
        } => cmd_edit(&cfg_dir, &document, &item, !no_pdf),
        Commands::AddLine {
            document,
            item,
            no_pdf,
        } => cmd_add_line(&cfg_dir, &document, &item, !no_pdf),
        Commands::SetLine {
            document,
            line,
            description,
            quantity,
            price,
            vat,
            no_pdf,
        } => {
            let edits: Vec<LineItemEdit> = [
                description.map(LineItemEdit::Description),
                quantity.map(LineItemEdit::Quantity),
                price.map(LineItemEdit::UnitPrice),
                vat.map(LineItemEdit::VatRate),
            ]
            .into_iter()
            .flatten()
            .collect();
            cmd_set_line(&cfg_dir, &document, line, edits, !no_pdf)
        }
        Commands::RemoveLine {
            document,
            line,
            no_pdf,
        } => cmd_remove_line(&cfg_dir, &document, line, !no_pdf),
        Commands::Convert {
            quote,
            no_pdf,
            open,
        } => cmd_convert(&cfg_dir, &quote, !no_pdf, open),
        Commands::SetStatus { document, status } => {
            cmd_set_status(&cfg_dir, &document, status.into())
        }
        Commands::Regenerate {
            document,
            no_pdf,
            open,
        } => cmd_regenerate(&cfg_dir, &document, !no_pdf, open),
        Commands::Open { document } => cmd_open(&cfg_dir, &document),
        Commands::History { limit, document } => cmd_history(&cfg_dir, limit, document),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(DossierError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::create_dir_all(cfg_dir.join("templates"))?;

    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("contacts.toml"), CONTACTS_TEMPLATE)?;
    fs::write(cfg_dir.join("items.toml"), ITEMS_TEMPLATE)?;
    fs::write(cfg_dir.join("templates.toml"), TEMPLATES_TEMPLATE)?;
    fs::write(cfg_dir.join("templates/factuur.html"), INVOICE_HTML_TEMPLATE)?;
    fs::write(cfg_dir.join("templates/offerte.html"), QUOTE_HTML_TEMPLATE)?;

    println!("Initialized dossier config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your organization:   $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Add your contacts:        $EDITOR {}/contacts.toml",
        cfg_dir.display()
    );
    println!(
        "  3. Configure the catalog:    $EDITOR {}/items.toml",
        cfg_dir.display()
    );
    println!(
        "  4. Adjust the templates:     {}/templates/",
        cfg_dir.display()
    );
    println!();
    println!("Then generate your first invoice:");
    println!("  dossier invoice --contact <contact-id> --item <item>:<quantity>");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct ContactRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "EMAIL")]
    email: String,
    #[tabled(rename = "CITY")]
    city: String,
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "UNIT")]
    unit: String,
    #[tabled(rename = "VAT")]
    vat: String,
}

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = " ")]
    selected: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TYPE")]
    doc_type: String,
    #[tabled(rename = "TAGS")]
    tags: String,
    #[tabled(rename = "DEFAULT")]
    default: &'static str,
    #[tabled(rename = "CREATED")]
    created: String,
}

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "CONTACT")]
    contact: String,
    #[tabled(rename = "NOTE")]
    note: String,
}

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "AT")]
    at: String,
    #[tabled(rename = "ACTION")]
    action: String,
    #[tabled(rename = "DOCUMENT")]
    document: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

fn print_generated(verb: &str, doc: &GeneratedDocument, currency_symbol: &str) {
    println!("{} {} {}", verb, doc.kind, doc.number);
    println!("  Contact:  {}", doc.contact);
    println!("  Template: {}", doc.template);
    println!("  Subtotal: {}", format_money(currency_symbol, doc.totals.subtotal));
    println!("  VAT:      {}", format_money(currency_symbol, doc.totals.vat_amount));
    println!("  Total:    {}", format_money(currency_symbol, doc.totals.total));
    println!("  Saved:    {}", doc.html_path.display());
    if let Some(pdf) = &doc.pdf_path {
        println!("  PDF:      {}", pdf.display());
    }
}

fn open_generated(doc: &GeneratedDocument) -> Result<()> {
    open_path(doc.pdf_path.as_ref().unwrap_or(&doc.html_path))
}

/// Generate a new invoice or quote
fn cmd_issue(cfg_dir: &Path, kind: DocumentKind, args: IssueArgs) -> Result<()> {
    if args.item.is_empty() {
        return Err(DossierError::NoItems);
    }

    let config = load_config(cfg_dir)?;
    let request = DocumentRequest {
        kind,
        contact: &args.contact,
        items: &args.item,
        template: args.template.as_deref(),
        tag: args.tag.as_deref(),
        output: args.output.clone(),
        pdf: !args.no_pdf,
    };

    let doc = generate_document(cfg_dir, request)?;
    print_generated("Generated", &doc, &config.invoice.currency_symbol);

    if args.open {
        open_generated(&doc)?;
    }
    Ok(())
}

/// List configured contacts
fn cmd_contacts(cfg_dir: &Path) -> Result<()> {
    let contacts = load_contacts(cfg_dir)?;

    if contacts.is_empty() {
        println!("No contacts configured.");
        println!("Add contacts to: {}/contacts.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = contacts.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<ContactRow> = sorted
        .iter()
        .map(|(id, contact)| ContactRow {
            id: id.to_string(),
            name: contact.name.clone(),
            email: contact.email.clone().unwrap_or_default(),
            city: contact.city.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// List catalog items
fn cmd_items(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let items = load_items(cfg_dir)?;

    if items.is_empty() {
        println!("No items configured.");
        println!("Add items to: {}/items.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = items.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<ItemRow> = sorted
        .iter()
        .map(|(id, item)| ItemRow {
            id: id.to_string(),
            description: item.description.clone(),
            price: format_money(&config.invoice.currency_symbol, item.unit_price),
            unit: format!("/{}", item.unit),
            vat: format!(
                "{}%",
                item.vat_rate.unwrap_or(config.invoice.default_vat_rate)
            ),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// List templates, optionally filtered, marking the resolved default
fn cmd_templates(
    cfg_dir: &Path,
    doc_type: Option<String>,
    tag: Option<String>,
    for_type: Option<String>,
) -> Result<()> {
    let templates = load_templates(cfg_dir)?;

    let filter = match (doc_type, tag) {
        (Some(t), _) => Some(TemplateFilter::Type(t)),
        (None, Some(tag)) => Some(TemplateFilter::Tag(tag)),
        (None, None) => None,
    };

    let shown = match &filter {
        Some(filter) => filter_templates(&templates, filter),
        None => templates.iter().collect(),
    };

    if shown.is_empty() {
        println!("No active templates match.");
        println!("Add templates to: {}/templates.toml", cfg_dir.display());
        return Ok(());
    }

    // Without a type, no template gets the type-match preference
    let selected = filter.as_ref().and_then(|filter| {
        let doc_type = match (&for_type, filter) {
            (Some(t), _) | (None, TemplateFilter::Type(t)) => t.as_str(),
            (None, TemplateFilter::Tag(_)) => "",
        };
        TemplateSelection::new()
            .refresh(&templates, filter, doc_type)
            .map(|t| t.id.clone())
    });

    let rows: Vec<TemplateRow> = sorted_for_display(&shown)
        .into_iter()
        .map(|t| TemplateRow {
            selected: if selected.as_deref() == Some(t.id.as_str()) { "*" } else { "" },
            id: t.id.clone(),
            name: t.name.clone(),
            doc_type: t.doc_type.clone(),
            tags: t.tags.join(", "),
            default: if t.is_default { "yes" } else { "" },
            created: t
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    if let Some(id) = selected {
        println!("Selected: {id}");
    }

    Ok(())
}

/// Show configuration summary
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let contacts = load_contacts(cfg_dir)?;
    let items = load_items(cfg_dir)?;
    let templates = load_templates(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    println!("Dossier Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Organization:     {}", config.organization.name);
    println!("Contacts:         {}", contacts.len());
    println!("Items:            {}", items.len());
    println!("Templates:        {}", templates.len());
    println!(
        "Next invoice:     {}",
        next_document_number(&config, &state, DocumentKind::Invoice)
    );
    println!(
        "Next quote:       {}",
        next_document_number(&config, &state, DocumentKind::Quote)
    );

    if !state.history.is_empty() {
        println!();
        println!("Recent documents:");
        for entry in state.history.iter().rev().take(5) {
            println!(
                "  {} - {} - {} - {}",
                entry.number,
                entry.kind,
                entry.contact,
                format_money(&config.invoice.currency_symbol, entry.totals.total)
            );
        }
    }

    Ok(())
}

/// List generated documents, newest first
fn cmd_list(cfg_dir: &Path, limit: Option<usize>, kind: Option<DocumentKind>) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let today = chrono::Local::now().date_naive();

    if state.history.is_empty() {
        println!("No documents generated yet.");
        return Ok(());
    }

    // Indices stay those of the unfiltered list so they work with other commands
    let documents: Vec<_> = state
        .history
        .iter()
        .rev()
        .enumerate()
        .filter(|(_, e)| kind.map_or(true, |k| e.kind == k))
        .collect();
    let documents = match limit {
        Some(n) => &documents[..n.min(documents.len())],
        None => &documents[..],
    };

    let rows: Vec<DocumentRow> = documents
        .iter()
        .map(|(idx, entry)| DocumentRow {
            index: idx + 1,
            number: entry.number.clone(),
            kind: entry.kind.to_string(),
            date: entry.date.to_string(),
            total: format_money(&config.invoice.currency_symbol, entry.totals.total),
            status: entry
                .status
                .effective(entry.kind, entry.due_date, today)
                .to_string(),
            contact: entry.contact.clone(),
            note: match (&entry.converted_to, &entry.converted_from) {
                (Some(invoice), _) => format!("converted to {invoice}"),
                (None, Some(quote)) => format!("from {quote}"),
                (None, None) => String::new(),
            },
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} documents", state.history.len());
    println!("Use index number with open/edit/regenerate/convert (e.g., 'dossier open 1')");

    Ok(())
}

/// Resolve a document reference to the actual document number.
/// Accepts either an index (1-based) from 'list' or the full number.
fn resolve_document_number(cfg_dir: &Path, reference: &str) -> Result<String> {
    let state = load_state(cfg_dir)?;

    if state.find(reference).is_some() {
        return Ok(reference.to_string());
    }

    if let Ok(idx) = reference.parse::<usize>() {
        // Documents are displayed newest first, 1-indexed
        if idx == 0 || idx > state.history.len() {
            return Err(DossierError::InvalidDocumentIndex(reference.to_string()));
        }
        return Ok(state.history[state.history.len() - idx].number.clone());
    }

    Err(DossierError::DocumentNotFound(reference.to_string()))
}

/// Replace the line items of a document
fn cmd_edit(cfg_dir: &Path, reference: &str, items: &[String], pdf: bool) -> Result<()> {
    if items.is_empty() {
        return Err(DossierError::NoItems);
    }

    let number = resolve_document_number(cfg_dir, reference)?;
    let config = load_config(cfg_dir)?;
    let doc = regenerate_document(cfg_dir, &number, Some(items), pdf)?;

    print_generated("Updated", &doc, &config.invoice.currency_symbol);
    println!("  Items:    {}", items.join(", "));
    Ok(())
}

fn cmd_add_line(cfg_dir: &Path, reference: &str, items: &[String], pdf: bool) -> Result<()> {
    if items.is_empty() {
        return Err(DossierError::NoItems);
    }

    let number = resolve_document_number(cfg_dir, reference)?;
    let config = load_config(cfg_dir)?;
    let doc = add_lines(cfg_dir, &number, items, pdf)?;

    print_generated("Updated", &doc, &config.invoice.currency_symbol);
    Ok(())
}

fn cmd_set_line(
    cfg_dir: &Path,
    reference: &str,
    line: usize,
    edits: Vec<LineItemEdit>,
    pdf: bool,
) -> Result<()> {
    let number = resolve_document_number(cfg_dir, reference)?;
    let config = load_config(cfg_dir)?;

    if edits.is_empty() {
        println!("Nothing to change on line {line} of {number}.");
        return Ok(());
    }

    let doc = update_line(cfg_dir, &number, line, edits, pdf)?;
    print_generated("Updated", &doc, &config.invoice.currency_symbol);
    Ok(())
}

fn cmd_remove_line(cfg_dir: &Path, reference: &str, line: usize, pdf: bool) -> Result<()> {
    let number = resolve_document_number(cfg_dir, reference)?;
    let config = load_config(cfg_dir)?;
    let (removed, doc) = remove_line(cfg_dir, &number, line, pdf)?;

    println!("Removed line {}: {}", line, removed.description);
    print_generated("Updated", &doc, &config.invoice.currency_symbol);
    Ok(())
}

fn cmd_convert(cfg_dir: &Path, reference: &str, pdf: bool, open: bool) -> Result<()> {
    let number = resolve_document_number(cfg_dir, reference)?;
    let config = load_config(cfg_dir)?;
    let doc = convert_quote(cfg_dir, &number, pdf)?;

    println!("Converted quote {} to invoice {}", number, doc.number);
    print_generated("Generated", &doc, &config.invoice.currency_symbol);

    if open {
        open_generated(&doc)?;
    }
    Ok(())
}

fn cmd_set_status(cfg_dir: &Path, reference: &str, status: DocumentStatus) -> Result<()> {
    let number = resolve_document_number(cfg_dir, reference)?;
    let previous = set_status(cfg_dir, &number, status)?;

    if previous == status {
        println!("{number} is already {status}");
    } else {
        println!("{number}: {previous} -> {status}");
    }
    Ok(())
}

/// Regenerate a document from stored data
fn cmd_regenerate(cfg_dir: &Path, reference: &str, pdf: bool, open: bool) -> Result<()> {
    let number = resolve_document_number(cfg_dir, reference)?;
    let config = load_config(cfg_dir)?;
    let doc = regenerate_document(cfg_dir, &number, None, pdf)?;

    print_generated("Regenerated", &doc, &config.invoice.currency_symbol);

    if open {
        open_generated(&doc)?;
    }
    Ok(())
}

/// Open a document
fn cmd_open(cfg_dir: &Path, reference: &str) -> Result<()> {
    let number = resolve_document_number(cfg_dir, reference)?;
    let path = get_document_path(cfg_dir, &number)?;

    open_path(&path)?;

    println!("Opened {}", path.display());
    Ok(())
}

/// Show the audit trail, newest first
fn cmd_history(cfg_dir: &Path, limit: Option<usize>, document: Option<String>) -> Result<()> {
    let state = load_state(cfg_dir)?;

    let rows: Vec<AuditRow> = state
        .audit
        .iter()
        .rev()
        .filter(|e| document.as_deref().map_or(true, |d| e.document == d))
        .take(limit.unwrap_or(usize::MAX))
        .map(|e| AuditRow {
            at: e.at.format("%Y-%m-%d %H:%M").to_string(),
            action: e.action.clone(),
            document: e.document.clone(),
            detail: e.detail.clone(),
        })
        .collect();

    if rows.is_empty() {
        println!("No history recorded yet.");
        return Ok(());
    }

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

fn open_path(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(path)
            .spawn()?;
    }
    Ok(())
}
