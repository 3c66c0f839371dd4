use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::model::MenuItem;

/// One product and its requested quantity in the active cart.
///
/// `name` and `unit_price` are snapshots taken when the item was first added;
/// later menu edits don't reach items already in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    /// Always at least 1 while the item is in a cart.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl LineItem {
    /// `unit_price × quantity`, unrounded. Saturates at `Decimal::MAX`.
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// A line item without a quantity: what "Add to Cart" hands to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemCandidate {
    pub id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub image_url: Option<String>,
}

impl CartItemCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            image_url: None,
        }
    }

    pub(crate) fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            name: self.name,
            unit_price: self.unit_price,
            quantity: 1,
            image_url: self.image_url,
        }
    }
}

impl From<&MenuItem> for CartItemCandidate {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.price,
            image_url: item.image_url.clone(),
        }
    }
}

/// Derived totals of a cart at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSnapshot {
    pub total_items: u64,
    pub total_amount: Decimal,
}

/// Formats a currency amount for display, e.g. `$20.00`.
///
/// Rounding to cents happens here and only here.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtotal_is_exact() {
        let item = LineItem {
            id: "a".into(),
            name: "Soup".into(),
            unit_price: Decimal::new(333, 2),
            quantity: 3,
            image_url: None,
        };
        assert_eq!(item.subtotal(), Decimal::new(999, 2));
    }

    #[test]
    fn test_subtotal_saturates_instead_of_overflowing() {
        let item = LineItem {
            id: "a".into(),
            name: "Caviar".into(),
            unit_price: Decimal::MAX,
            quantity: 2,
            image_url: None,
        };
        assert_eq!(item.subtotal(), Decimal::MAX);
    }

    #[test]
    fn test_format_amount_rounds_only_for_display() {
        assert_eq!(format_amount(Decimal::new(20, 0)), "$20.00");
        assert_eq!(format_amount(Decimal::new(10005, 3)), "$10.01");
        assert_eq!(format_amount(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_line_item_uses_price_key_on_the_wire() {
        let json = r#"{"id":"a","name":"Soup","price":"4.50","quantity":2}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.unit_price, Decimal::new(450, 2));
        assert_eq!(item.image_url, None);
    }
}
