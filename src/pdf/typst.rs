use std::path::Path;
use std::process::Command;

use crate::document::{document_file_stem, DocumentData};
use crate::error::{DossierError, Result};

/// Embedded Typst template for invoices and quotes.
/// Uses a placeholder that gets replaced with the actual JSON file path.
/// Page geometry comes from `data.layout`, already converted to millimetres.
const DOCUMENT_TEMPLATE: &str = r##"// Invoice / quote template
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")
#let layout = data.layout

#set page(
  paper: "a4",
  margin: layout.margin_mm * 1mm,
)

#set text(font: "Helvetica", size: layout.font_size_pt * 1pt)
#set par(leading: layout.line_spacing_mm * 1mm - layout.font_size_pt * 1pt)

#let fmt-currency(amount) = {
  let parts = str(calc.round(amount, digits: 2)).split(".")
  let frac = if parts.len() > 1 { parts.at(1) } else { "00" }
  let frac2 = if frac.len() == 1 { frac + "0" } else { frac }
  data.currency_symbol + parts.at(0) + "," + frac2
}

#let fmt-qty(q) = if calc.fract(q) == 0 { str(int(q)) } else { str(q) }

// Header with organization info and document details
#block(height: layout.header_height_mm * 1mm)[
  #grid(
    columns: (1fr, 1fr),
    align: (left, right),
    [
      #text(size: 16pt, weight: "bold")[#data.organization.name]
      #v(0.3em)
      #data.organization.address \
      #data.organization.postal_code #data.organization.city \
      #data.organization.email
      #if data.organization.phone != none [
        \ #data.organization.phone
      ]
    ],
    [
      #text(size: 22pt, weight: "bold")[#data.title]
      #v(0.5em)
      #table(
        columns: (auto, auto),
        stroke: none,
        align: (right, left),
        inset: 2pt,
        [*Nummer:*], [#data.number],
        [*Datum:*], [#data.date],
        [*#data.due_label:*], [#data.due_date],
      )
    ]
  )
]

#line(length: 100%, stroke: 0.5pt + gray)
#v(layout.spacing_mm * 1mm)

// Addressee
#text(weight: "bold")[#data.contact.name]
#if data.contact.contact_person != none [
  \ t.a.v. #data.contact.contact_person
]
#if data.contact.address != none [
  \ #data.contact.address
]
#if data.contact.city != none [
  \ #if data.contact.postal_code != none [#data.contact.postal_code ] #data.contact.city
]
\ #data.country
#if data.contact.dossier != none [
  #v(0.5em)
  #text(size: 9pt)[Dossier: #data.contact.dossier]
]

#v(layout.spacing_mm * 2mm)

// Line items table
#table(
  columns: (auto, 1fr, auto, auto, auto, auto),
  align: (center, left, right, right, right, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else { (bottom: 0.5pt + gray) },
  inset: 7pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  [*\#*], [*Omschrijving*], [*Aantal*], [*Prijs*], [*BTW*], [*Totaal*],

  ..data.items.enumerate().map(((i, item)) => (
    str(i + 1),
    item.description,
    fmt-qty(item.quantity),
    [#fmt-currency(item.unit_price)],
    [#fmt-qty(item.vat_rate)%],
    [#fmt-currency(item.line_total)],
  )).flatten()
)

#v(layout.spacing_mm * 1mm)

// Totals
#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 6pt,
    [Subtotaal:], [#fmt-currency(data.totals.subtotal)],
    [BTW:], [#fmt-currency(data.totals.vat_amount)],
    table.hline(stroke: 1pt),
    [*Totaal:*], [*#fmt-currency(data.totals.total)*],
  )
]

#v(layout.spacing_mm * 2mm)

#text(weight: "bold")[#data.terms]

#if data.notes != none [
  #v(0.5em)
  #data.notes
]

#if data.organization.iban != none [
  #v(1em)
  #text(size: 9pt, fill: gray)[IBAN: #data.organization.iban]
]
#if data.organization.vat_number != none [
  \ #text(size: 9pt, fill: gray)[BTW-nummer: #data.organization.vat_number]
]
#if data.organization.coc_number != none [
  \ #text(size: 9pt, fill: gray)[KvK: #data.organization.coc_number]
]
"##;

/// Generate PDF using Typst CLI
pub fn generate_pdf(data: &DocumentData, output_path: &Path) -> Result<()> {
    // Check if typst is available
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(DossierError::TypstNotFound);
    }

    let temp_dir = std::env::temp_dir().join("dossier-cli");
    std::fs::create_dir_all(&temp_dir)?;

    let json_data =
        serde_json::to_string(data).map_err(|e| DossierError::PdfGeneration(e.to_string()))?;

    let stem = document_file_stem(&data.number);
    let json_name = format!("{stem}.json");
    let json_path = temp_dir.join(&json_name);
    std::fs::write(&json_path, &json_data)?;

    // data file sits next to the template, so the path stays relative
    let template_content = DOCUMENT_TEMPLATE.replace("DATA_JSON_PATH", &json_name);
    let template_path = temp_dir.join(format!("{stem}.typ"));
    std::fs::write(&template_path, &template_content)?;

    tracing::debug!(template = %template_path.display(), "running typst compile");
    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(&temp_dir)
        .arg(&template_path)
        .arg(output_path)
        .output()?;

    let _ = std::fs::remove_file(&template_path);
    let _ = std::fs::remove_file(&json_path);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DossierError::PdfGeneration(stderr.to_string()));
    }

    Ok(())
}
