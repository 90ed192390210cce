use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Item;
use crate::error::{DossierError, Result};

/// VAT rate given to freshly added lines.
pub const DEFAULT_VAT_RATE: f64 = 21.0;

/// One billable row on an invoice or quote.
///
/// `line_total` is always `quantity * unit_price`. It is recomputed by every
/// edit and there is no way to set it directly.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LineItem {
    pub id: String,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Percentage, 0 to 100.
    pub vat_rate: f64,
    pub line_total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<u32>,
}

/// A single field change applied through [`LineItems::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum LineItemEdit {
    Description(String),
    Quantity(f64),
    UnitPrice(f64),
    VatRate(f64),
    SortOrder(Option<u32>),
}

impl LineItemEdit {
    /// Reject values no line may hold. `item` names the line in the error.
    pub fn validate(&self, item: &str) -> Result<()> {
        match *self {
            LineItemEdit::Quantity(quantity) if !quantity.is_finite() || quantity < 0.0 => {
                Err(DossierError::InvalidQuantity {
                    item: item.to_string(),
                    qty: quantity.to_string(),
                    reason: "must be a non-negative number".to_string(),
                })
            }
            LineItemEdit::UnitPrice(price) if !price.is_finite() => {
                Err(DossierError::InvalidUnitPrice {
                    item: item.to_string(),
                    price,
                })
            }
            LineItemEdit::VatRate(rate) if !(0.0..=100.0).contains(&rate) => {
                Err(DossierError::InvalidVatRate {
                    item: item.to_string(),
                    rate,
                })
            }
            _ => Ok(()),
        }
    }
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64, vat_rate: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            quantity,
            unit_price,
            vat_rate,
            line_total: quantity * unit_price,
            sort_order: None,
        }
    }

    /// Empty row: no description, zero quantity and price, default VAT.
    pub fn blank() -> Self {
        Self::new("", 0.0, 0.0, DEFAULT_VAT_RATE)
    }

    /// Build a line from a catalog entry.
    pub fn from_catalog(item: &Item, quantity: f64, default_vat_rate: f64) -> Self {
        Self::new(
            item.description.clone(),
            quantity,
            item.unit_price,
            item.vat_rate.unwrap_or(default_vat_rate),
        )
    }

    pub fn vat_amount(&self) -> f64 {
        self.line_total * self.vat_rate / 100.0
    }

    fn apply(&mut self, edit: LineItemEdit) {
        match edit {
            LineItemEdit::Description(description) => self.description = description,
            LineItemEdit::Quantity(quantity) => self.quantity = quantity,
            LineItemEdit::UnitPrice(unit_price) => self.unit_price = unit_price,
            LineItemEdit::VatRate(vat_rate) => self.vat_rate = vat_rate,
            LineItemEdit::SortOrder(sort_order) => self.sort_order = sort_order,
        }
        self.line_total = self.quantity * self.unit_price;
    }
}

/// Whether the last remaining line may be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    AllowEmpty,
    KeepOne,
}

/// Ordered, editable list of line items.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItems {
    items: Vec<LineItem>,
    policy: RemovalPolicy,
}

impl LineItems {
    pub fn new(policy: RemovalPolicy) -> Self {
        Self {
            items: Vec::new(),
            policy,
        }
    }

    pub fn from_items(items: Vec<LineItem>, policy: RemovalPolicy) -> Self {
        Self { items, policy }
    }

    pub fn as_slice(&self) -> &[LineItem] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<LineItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a blank line and return its index.
    pub fn add(&mut self) -> usize {
        self.add_item(LineItem::blank())
    }

    pub fn add_item(&mut self, item: LineItem) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Apply `edit` to the item at `index`. Returns false when out of range.
    pub fn update(&mut self, index: usize, edit: LineItemEdit) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.apply(edit);
                true
            }
            None => false,
        }
    }

    /// Remove the item at `index`, keeping the others in order.
    ///
    /// Returns `None` without touching the list when the index is out of
    /// range, or when the policy is `KeepOne` and only one item is left.
    pub fn remove(&mut self, index: usize) -> Option<LineItem> {
        if index >= self.items.len() {
            return None;
        }
        if self.policy == RemovalPolicy::KeepOne && self.items.len() == 1 {
            return None;
        }
        Some(self.items.remove(index))
    }
}

/// Parse item input like "consulting:8" into (item_id, quantity)
pub fn parse_item_input(input: &str) -> Result<(&str, f64)> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != 2 {
        return Err(DossierError::InvalidItemFormat(input.to_string()));
    }

    let item_id = parts[0];
    let qty_str = parts[1];

    let quantity: f64 = qty_str.parse().map_err(|_| DossierError::InvalidQuantity {
        item: item_id.to_string(),
        qty: qty_str.to_string(),
        reason: "must be a number".to_string(),
    })?;

    if !quantity.is_finite() || quantity < 0.0 {
        return Err(DossierError::InvalidQuantity {
            item: item_id.to_string(),
            qty: qty_str.to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    Ok((item_id, quantity))
}
