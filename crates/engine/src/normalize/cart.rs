//! Cart response normalization.
//!
//! Cart payloads are the least consistent surface of the backend: the line
//! array may be the response itself or may hide under `items`, `detalle`,
//! `detalleCarrito` or `data`, and individual lines mix Spanish, English
//! and nested-product field names. Normalization here is total: every line
//! in the located array yields exactly one [`CartLine`], even if all its
//! fields default.

use rust_decimal::Decimal;
use serde_json::Value;

use mercadito_core::{CartLine, ProductId};

use crate::resolve::{
    resolve, resolve_decimal, resolve_id, resolve_quantity, resolve_string, value_to_decimal,
};

/// Wrapper keys probed, in order, for the line-item array.
const WRAPPER_CANDIDATES: &[&str] = &["items", "detalle", "detalleCarrito", "data"];

/// Wrapper keys probed when counting. The badge tolerates one more shape
/// than line normalization does: some builds wrap the count source under
/// `products`.
const COUNT_WRAPPER_CANDIDATES: &[&str] =
    &["products", "items", "detalle", "detalleCarrito", "data"];

/// Candidate key paths for the line's product id.
const PRODUCT_ID_CANDIDATES: &[&str] = &["productId", "idProducto", "id_producto", "id", "product.id"];
/// Candidate key paths for the quantity.
const QUANTITY_CANDIDATES: &[&str] = &["cantidad", "qty", "quantity", "cant"];
/// Candidate key paths for the unit price, discounted price first.
const PRICE_CANDIDATES: &[&str] = &[
    "precioEspecial",
    "specialPrice",
    "precio",
    "price",
    "product.precioEspecial",
    "product.precio",
];
/// Candidate key paths for the display name.
const NAME_CANDIDATES: &[&str] = &["nombre", "productName", "name", "product.nombre"];
/// Candidate key paths for the image URL.
const IMAGE_CANDIDATES: &[&str] = &["urlImagen", "imagen", "product.urlImagen"];

/// Normalize a cart retrieval response into canonical lines.
///
/// Never fails: `null`, unknown wrappers and non-array shapes all
/// normalize to an empty list. The output length always equals the length
/// of the located array; no line is dropped.
#[must_use]
pub fn normalize_cart_response(raw: &Value) -> Vec<CartLine> {
    let Some(items) = locate_lines(raw) else {
        return Vec::new();
    };

    items.iter().map(normalize_line).collect()
}

fn locate_lines(raw: &Value) -> Option<&Vec<Value>> {
    if let Some(items) = raw.as_array() {
        return Some(items);
    }
    WRAPPER_CANDIDATES
        .iter()
        .find_map(|key| raw.get(*key)?.as_array())
}

fn normalize_line(raw: &Value) -> CartLine {
    let product_id = resolve_id(Some(raw), PRODUCT_ID_CANDIDATES).unwrap_or(0);

    CartLine {
        product_id: ProductId::new(product_id),
        name: resolve_string(Some(raw), NAME_CANDIDATES),
        unit_price: resolve_decimal(Some(raw), PRICE_CANDIDATES),
        quantity: resolve_quantity(Some(raw), QUANTITY_CANDIDATES),
        image_url: resolve_string(Some(raw), IMAGE_CANDIDATES),
    }
}

/// Sum of `unit_price × quantity` over all lines.
///
/// Order-independent; used whenever the server supplies no parseable
/// authoritative total.
#[must_use]
pub fn compute_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

/// The server-supplied cart total, when one parses numerically.
#[must_use]
pub fn server_total(raw: &Value) -> Option<Decimal> {
    resolve(Some(raw), &["total", "montoTotal", "totalPrice"]).and_then(value_to_decimal)
}

/// Item count derived from a server cart payload, for badge display.
///
/// Sums line quantities. A line carrying no quantity key counts as 1 (it
/// exists, so at least one unit does); a present but unparseable quantity
/// counts as 0. A sum of zero falls back to the line count, and anything
/// unrecognizable counts as zero.
#[must_use]
pub fn extract_count(raw: &Value) -> u32 {
    let Some(items) = locate_count_lines(raw) else {
        return 0;
    };

    let total: u32 = items
        .iter()
        .map(|item| {
            resolve(Some(item), QUANTITY_CANDIDATES)
                .map_or(1, |v| crate::resolve::value_to_u32(v).unwrap_or(0))
        })
        .sum();

    if total > 0 {
        total
    } else {
        u32::try_from(items.len()).unwrap_or(u32::MAX)
    }
}

fn locate_count_lines(raw: &Value) -> Option<&Vec<Value>> {
    if let Some(items) = raw.as_array() {
        return Some(items);
    }
    COUNT_WRAPPER_CANDIDATES
        .iter()
        .find_map(|key| raw.get(*key)?.as_array())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_wrapped_items() {
        let raw = json!({"items": [{"idProducto": 4, "cantidad": 2, "precio": 15}]});
        let lines = normalize_cart_response(&raw);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id.as_i64(), 4);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].unit_price, Decimal::from(15));
    }

    #[test]
    fn test_normalize_bare_array() {
        let raw = json!([{"id_producto": 1}, {"id_producto": 2}]);
        assert_eq!(normalize_cart_response(&raw).len(), 2);
    }

    #[test]
    fn test_normalize_detalle_carrito_wrapper() {
        let raw = json!({"detalleCarrito": [{"productId": 8, "qty": 3}]});
        let lines = normalize_cart_response(&raw);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
    }

    #[test]
    fn test_normalize_malformed_is_empty() {
        assert!(normalize_cart_response(&json!(null)).is_empty());
        assert!(normalize_cart_response(&json!([])).is_empty());
        assert!(normalize_cart_response(&json!({"unknown": [1]})).is_empty());
        assert!(normalize_cart_response(&json!(42)).is_empty());
    }

    #[test]
    fn test_no_line_dropped_even_when_all_fields_default() {
        let raw = json!({"items": [{}, {"garbage": true}]});
        let lines = normalize_cart_response(&raw);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_id.as_i64(), 0);
        assert_eq!(lines[0].quantity, 1);
        assert_eq!(lines[0].unit_price, Decimal::ZERO);
    }

    #[test]
    fn test_special_price_takes_precedence() {
        let raw = json!({"items": [{"id": 1, "precioEspecial": 8, "precio": 10}]});
        let lines = normalize_cart_response(&raw);
        assert_eq!(lines[0].unit_price, Decimal::from(8));
    }

    #[test]
    fn test_nested_product_price_fallback() {
        let raw = json!({"items": [{"id": 1, "product": {"precio": 30}}]});
        let lines = normalize_cart_response(&raw);
        assert_eq!(lines[0].unit_price, Decimal::from(30));
    }

    #[test]
    fn test_compute_total_order_independent() {
        let raw = json!({"items": [
            {"id": 1, "precio": 10, "cantidad": 2},
            {"id": 2, "precio": 5, "cantidad": 1},
            {"id": 3, "precio": "2.50", "cantidad": 4}
        ]});
        let mut lines = normalize_cart_response(&raw);
        let forward = compute_total(&lines);
        lines.reverse();
        assert_eq!(compute_total(&lines), forward);
        assert_eq!(forward, Decimal::new(3500, 2));
    }

    #[test]
    fn test_server_total_parseable() {
        let raw = json!({"total": "99.90", "items": []});
        assert_eq!(server_total(&raw), Some(Decimal::new(9990, 2)));
    }

    #[test]
    fn test_server_total_unparseable_is_none() {
        let raw = json!({"total": "not-a-number", "items": [{"precio": 10, "cantidad": 3}]});
        assert_eq!(server_total(&raw), None);
        // display code falls back to the computed sum
        let lines = normalize_cart_response(&raw);
        assert_eq!(compute_total(&lines), Decimal::from(30));
    }

    #[test]
    fn test_extract_count_sums_quantities() {
        let raw = json!({"detalle": [{"cantidad": 2}, {"qty": 3}]});
        assert_eq!(extract_count(&raw), 5);
    }

    #[test]
    fn test_extract_count_quantityless_line_counts_as_one() {
        let raw = json!({"items": [{"cantidad": 2}, {}]});
        assert_eq!(extract_count(&raw), 3);
    }

    #[test]
    fn test_extract_count_probes_products_wrapper() {
        let raw = json!({"products": [{"cantidad": 2}]});
        assert_eq!(extract_count(&raw), 2);
    }

    #[test]
    fn test_extract_count_falls_back_to_line_count() {
        // explicit zeros sum to nothing; the line count stands in
        let raw = json!([{"cantidad": 0}, {"cantidad": 0}]);
        assert_eq!(extract_count(&raw), 2);
    }

    #[test]
    fn test_extract_count_unfamiliar_shape_is_zero() {
        assert_eq!(extract_count(&json!({"weird": true})), 0);
        assert_eq!(extract_count(&json!(null)), 0);
    }
}
