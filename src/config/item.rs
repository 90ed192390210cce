use serde::{Deserialize, Serialize};

/// A catalog entry that line items are built from.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Item {
    pub description: String,
    pub unit_price: f64,
    pub unit: String,
    /// Uses the invoice `default_vat_rate` when absent.
    #[serde(default)]
    pub vat_rate: Option<f64>,
}
