mod generator;
mod kind;
mod line_items;
mod render;
mod status;
mod template;
mod totals;

pub use generator::{
    add_lines, convert_quote, format_document_number, generate_document, get_document_path,
    document_file_stem, next_document_number, regenerate_document, remove_line, set_status,
    update_line, DocumentData, DocumentRequest, GeneratedDocument,
};
pub use kind::DocumentKind;
pub use line_items::{
    parse_item_input, LineItem, LineItemEdit, LineItems, RemovalPolicy, DEFAULT_VAT_RATE,
};
pub use render::{escape_html, render_html, render_line_items, RenderContext};
pub use status::DocumentStatus;
pub use template::{
    filter_templates, resolve_default, sorted_for_display, DocumentTemplate, TemplateFilter,
    TemplateSelection,
};
pub use totals::{calculate_totals, calculate_totals_with, format_money, InvoiceTotals, VatDisplay};
