use serde::{Deserialize, Serialize};

use super::LineItem;

/// How entered unit prices relate to VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VatDisplay {
    /// Prices exclude VAT; VAT is added on top.
    #[default]
    Exclusive,
    /// Prices include VAT; VAT is extracted from each line.
    Inclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub vat_amount: f64,
    pub total: f64,
}

/// Aggregate totals for VAT-exclusive prices.
pub fn calculate_totals(items: &[LineItem]) -> InvoiceTotals {
    calculate_totals_with(items, VatDisplay::Exclusive)
}

pub fn calculate_totals_with(items: &[LineItem], display: VatDisplay) -> InvoiceTotals {
    let (subtotal, vat_amount) = items.iter().fold((0.0, 0.0), |(subtotal, vat), item| {
        let rate = item.vat_rate / 100.0;
        match display {
            VatDisplay::Exclusive => (subtotal + item.line_total, vat + item.line_total * rate),
            VatDisplay::Inclusive => {
                let excl = item.line_total / (1.0 + rate);
                (subtotal + excl, vat + (item.line_total - excl))
            }
        }
    });

    InvoiceTotals {
        subtotal,
        vat_amount,
        total: subtotal + vat_amount,
    }
}

/// Two-decimal money string, e.g. `€1234.50`.
pub fn format_money(symbol: &str, amount: f64) -> String {
    format!("{}{:.2}", symbol, amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<LineItem> {
        vec![
            LineItem::new("advies", 2.0, 195.0, 21.0),
            LineItem::new("reiskosten", 1.0, 40.0, 9.0),
            LineItem::new("griffierecht", 1.0, 320.0, 0.0),
        ]
    }

    #[test]
    fn exclusive_totals_follow_the_fold() {
        let items = lines();
        let totals = calculate_totals(&items);

        let subtotal: f64 = items.iter().map(|i| i.line_total).sum();
        let vat: f64 = items.iter().map(|i| i.line_total * i.vat_rate / 100.0).sum();

        assert_eq!(totals.subtotal, subtotal);
        assert!((totals.vat_amount - vat).abs() < 1e-9);
        assert!((totals.vat_amount - 85.5).abs() < 1e-9);
        assert_eq!(totals.total, totals.subtotal + totals.vat_amount);
        assert!((totals.total - 835.5).abs() < 1e-9);
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(calculate_totals(&[]), InvoiceTotals::default());
    }

    #[test]
    fn totals_are_idempotent() {
        let items = lines();
        let snapshot = items.clone();
        assert_eq!(calculate_totals(&items), calculate_totals(&items));
        assert_eq!(items, snapshot);
    }

    #[test]
    fn inclusive_prices_extract_vat() {
        let items = vec![LineItem::new("advies", 1.0, 121.0, 21.0)];
        let totals = calculate_totals_with(&items, VatDisplay::Inclusive);

        assert!((totals.subtotal - 100.0).abs() < 1e-9);
        assert!((totals.vat_amount - 21.0).abs() < 1e-9);
        assert!((totals.total - 121.0).abs() < 1e-9);
    }

    #[test]
    fn money_has_two_decimals() {
        assert_eq!(format_money("€", 835.5), "€835.50");
        assert_eq!(format_money("$", 0.0), "$0.00");
    }
}
