use serde::{Deserialize, Serialize};

use crate::document::VatDisplay;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub organization: Organization,
    pub invoice: InvoiceSettings,
    pub quote: QuoteSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    pub pdf: PdfSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Organization {
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub vat_number: Option<String>,
    #[serde(default)]
    pub coc_number: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoiceSettings {
    pub number_format: String,
    pub currency_symbol: String,
    pub payment_terms: u32,
    #[serde(default = "default_vat_rate")]
    pub default_vat_rate: f64,
    #[serde(default)]
    pub vat_display: VatDisplay,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuoteSettings {
    pub number_format: String,
    pub validity_days: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Pixel-based page metrics, converted to millimetres by [`crate::layout`].
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LayoutSettings {
    pub padding_px: f64,
    pub header_height_px: f64,
    pub content_spacing_px: f64,
    pub font_size_px: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            padding_px: 60.0,
            header_height_px: 100.0,
            content_spacing_px: 16.0,
            font_size_px: 12.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_vat_rate() -> f64 {
    crate::document::DEFAULT_VAT_RATE
}

fn default_true() -> bool {
    true
}
