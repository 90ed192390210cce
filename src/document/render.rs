//! Placeholder substitution for HTML templates.

use super::{format_money, InvoiceTotals, LineItem};

/// Values substituted into a template.
#[derive(Debug, Clone, Default)]
pub struct RenderContext<'a> {
    pub number: &'a str,
    pub company_name: &'a str,
    pub client_name: Option<&'a str>,
    pub client_email: Option<&'a str>,
    pub client_address: Option<&'a str>,
    pub client_postal_code: Option<&'a str>,
    pub client_city: Option<&'a str>,
    pub client_country: Option<&'a str>,
    pub date: &'a str,
    pub due_date: &'a str,
    pub payment_terms: u32,
    pub notes: Option<&'a str>,
    pub currency_symbol: &'a str,
    pub items: &'a [LineItem],
    pub totals: InvoiceTotals,
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn or_label(value: Option<&str>, label: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => escape_html(v),
        _ => label.to_string(),
    }
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{}", quantity)
    }
}

/// Table rows for `%LINE_ITEMS%`.
pub fn render_line_items(items: &[LineItem], currency_symbol: &str) -> String {
    const CELL: &str = "padding: 8px; border-bottom: 1px solid #e5e7eb;";
    items
        .iter()
        .map(|item| {
            let description = if item.description.is_empty() {
                "[Omschrijving]".to_string()
            } else {
                escape_html(&item.description)
            };
            format!(
                "<tr><td style=\"{CELL}\">{}</td>\
                 <td style=\"{CELL} text-align: right;\">{}</td>\
                 <td style=\"{CELL} text-align: right;\">{}</td>\
                 <td style=\"{CELL} text-align: right;\">{}%</td>\
                 <td style=\"{CELL} text-align: right;\">{}</td></tr>",
                description,
                format_quantity(item.quantity),
                escape_html(&format_money(currency_symbol, item.unit_price)),
                format_quantity(item.vat_rate),
                escape_html(&format_money(currency_symbol, item.line_total)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitute every known placeholder in `html` in one left-to-right pass.
/// Substituted values are never scanned again, and unknown `%...%` spans
/// are copied through unchanged.
pub fn render_html(html: &str, ctx: &RenderContext<'_>) -> String {
    let money = |amount: f64| escape_html(&format_money(ctx.currency_symbol, amount));
    let number = if ctx.number.is_empty() {
        "CONCEPT".to_string()
    } else {
        escape_html(ctx.number)
    };

    let replacements = [
        ("INVOICE_NUMBER", number.clone()),
        ("DOCUMENT_NUMBER", number),
        ("COMPANY_NAME", escape_html(ctx.company_name)),
        ("CLIENT_NAME", or_label(ctx.client_name, "[Klantnaam]")),
        ("CLIENT_EMAIL", or_label(ctx.client_email, "[Klant email]")),
        ("CLIENT_ADDRESS", or_label(ctx.client_address, "[Klant adres]")),
        ("CLIENT_POSTAL_CODE", or_label(ctx.client_postal_code, "[Postcode]")),
        ("CLIENT_CITY", or_label(ctx.client_city, "[Plaats]")),
        ("CLIENT_COUNTRY", or_label(ctx.client_country, "Nederland")),
        ("INVOICE_DATE", escape_html(ctx.date)),
        ("DUE_DATE", escape_html(ctx.due_date)),
        ("PAYMENT_TERMS", ctx.payment_terms.to_string()),
        ("NOTES", ctx.notes.map(escape_html).unwrap_or_default()),
        ("LINE_ITEMS", render_line_items(ctx.items, ctx.currency_symbol)),
        ("SUBTOTAL", money(ctx.totals.subtotal)),
        ("VAT_AMOUNT", money(ctx.totals.vat_amount)),
        ("TOTAL_AMOUNT", money(ctx.totals.total)),
    ];
    let lookup = |token: &str| {
        replacements
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, value)| value.as_str())
    };

    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let known = after
            .find('%')
            .and_then(|end| lookup(&after[..end]).map(|value| (end, value)));
        match known {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
