//! Line-item net amounts and invoice totals.

/// A line item as submitted from the invoice form, before it is persisted.
#[derive(Debug, Clone, Default)]
pub struct ItemInput {
    pub title: String,
    pub termin: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: f64,
    /// Explicit net amount. When present it wins over quantity x unit price.
    pub net: Option<f64>,
}

impl ItemInput {
    /// Net amount of this item: the explicit value if one was supplied,
    /// otherwise quantity x unit price (missing quantity counts as 0).
    pub fn net_amount(&self) -> f64 {
        self.net
            .unwrap_or_else(|| self.quantity.unwrap_or(0.0) * self.unit_price)
    }

    /// True when every field is blank, i.e. the form row was left empty.
    pub fn is_blank(&self) -> bool {
        self.title.is_empty()
            && self.termin.is_none()
            && self.quantity.is_none()
            && self.unit_price == 0.0
            && self.net.is_none()
    }
}

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Invoice total: rounded sum of the item nets. Empty set totals 0.
pub fn total_net(items: &[ItemInput]) -> f64 {
    round2(items.iter().map(ItemInput::net_amount).sum())
}

/// Lenient numeric parsing for form input: blank or malformed values are 0.
/// Accepts a decimal comma as well as a decimal point.
pub fn parse_amount(raw: &str) -> f64 {
    raw.trim().replace(',', ".").parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: Option<f64>, unit_price: f64, net: Option<f64>) -> ItemInput {
        ItemInput {
            title: "work".into(),
            quantity,
            unit_price,
            net,
            ..Default::default()
        }
    }

    #[test]
    fn net_derived_from_quantity_and_price() {
        assert_eq!(item(Some(3.0), 10.0, None).net_amount(), 30.0);
    }

    #[test]
    fn explicit_net_wins() {
        assert_eq!(item(Some(3.0), 10.0, Some(50.0)).net_amount(), 50.0);
    }

    #[test]
    fn missing_quantity_counts_as_zero() {
        assert_eq!(item(None, 10.0, None).net_amount(), 0.0);
    }

    #[test]
    fn total_is_rounded_sum() {
        let items = vec![
            item(Some(1.0), 10.004, None),
            item(Some(1.0), 10.004, None),
        ];
        assert_eq!(total_net(&items), 20.01);
    }

    #[test]
    fn empty_invoice_totals_zero() {
        assert_eq!(total_net(&[]), 0.0);
    }

    #[test]
    fn lenient_parsing() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("  "), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("12.5"), 12.5);
        assert_eq!(parse_amount("12,5"), 12.5);
        assert_eq!(parse_amount(" 7 "), 7.0);
    }

    #[test]
    fn blank_row_detection() {
        assert!(ItemInput::default().is_blank());
        assert!(!item(None, 0.0, Some(1.0)).is_blank());
    }
}
