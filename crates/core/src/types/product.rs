//! Canonical catalog entities.
//!
//! The backend catalog service is inconsistent about field names
//! (`id_producto` vs `idProducto` vs `productId`, `nombre` vs `name`).
//! `Product` is the single shape every raw record normalizes into: all
//! fields are always populated with a type-correct value (empty string,
//! zero) so rendering code never branches on absence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{CategoryId, ProductId};

/// A catalog product, normalized from one raw record.
///
/// Immutable once constructed; discarded on the next fetch. Only `id`
/// carries identity across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID. Required and stable.
    pub id: ProductId,
    /// Display name. Empty string when the source omitted it.
    pub name: String,
    /// Unit price, never negative. Zero when absent or unparseable.
    pub price: Decimal,
    /// Plain text description.
    pub description: String,
    /// Category display name.
    pub category: String,
    /// Brand display name.
    pub brand: String,
    /// Product image URL.
    pub image_url: String,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Category display name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_serde_round_trip() {
        let product = Product {
            id: ProductId::new(3),
            name: "Zapatilla".to_string(),
            price: Decimal::new(1999, 2),
            description: String::new(),
            category: "Calzado".to_string(),
            brand: String::new(),
            image_url: String::new(),
        };

        let json = serde_json::to_string(&product).expect("serialize");
        let back: Product = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, product);
    }
}
