//! Canonical cart entities.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A cart line item, normalized from one raw payload entry.
///
/// `quantity` is always a non-negative integer (defaulting to 1 when the
/// source value was absent or unparseable). `unit_price` resolution follows
/// the documented precedence (special price, generic price, nested product
/// prices, else zero).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Display name. Empty when the payload carried none.
    pub name: String,
    /// Price per unit, never negative.
    pub unit_price: Decimal,
    /// Units of this product in the cart.
    pub quantity: u32,
    /// Product image URL, empty when absent.
    pub image_url: String,
}

impl CartLine {
    /// Total for this line (`unit_price` × `quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A cart line resolved for display.
///
/// Same shape as [`CartLine`]; the distinction is provenance: view lines
/// come out of reconciliation, with display fields already filled in from
/// the catalog when the line was rebuilt from the local snapshot
/// (placeholder name and zero price for products the catalog no longer
/// knows).
pub type CartViewLine = CartLine;

/// One entry of the durable local cart mirror.
///
/// Unique per `product_id` within the store; removed when the quantity
/// drops to zero. The wire layout matches what the backend's cart
/// mutations accept (`productId`/`cantidad`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSnapshotEntry {
    /// Product this entry mirrors.
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    /// Last known confirmed quantity.
    #[serde(rename = "cantidad")]
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let line = CartLine {
            product_id: ProductId::new(1),
            name: "Shoe".to_string(),
            unit_price: Decimal::new(2000, 2),
            quantity: 3,
            image_url: String::new(),
        };
        assert_eq!(line.line_total(), Decimal::new(6000, 2));
    }

    #[test]
    fn test_snapshot_entry_wire_layout() {
        let entry = LocalSnapshotEntry {
            product_id: ProductId::new(7),
            quantity: 2,
        };
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["productId"], 7);
        assert_eq!(json["cantidad"], 2);
    }
}
