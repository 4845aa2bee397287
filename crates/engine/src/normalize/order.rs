//! Order history normalization.

use serde_json::Value;

use mercadito_core::{Order, OrderId, OrderLine, OrderStatus, ProductId};

use super::product::locate_array;
use crate::resolve::{resolve, resolve_decimal, resolve_id, resolve_quantity, resolve_string};

/// Candidate key paths for the order id.
const ID_CANDIDATES: &[&str] = &["idPedido", "id", "orderId"];
/// Candidate key paths for the order total.
const TOTAL_CANDIDATES: &[&str] = &["total", "montoTotal", "totalPrice"];
/// Candidate key paths for the placement timestamp.
const DATE_CANDIDATES: &[&str] = &["fecha", "fechaCreacion", "createdAt", "date"];
/// Candidate key paths for the lifecycle state.
const STATUS_CANDIDATES: &[&str] = &["estado", "status"];

/// Wrapper keys an order's line array may hide under.
const LINE_WRAPPERS: &[&str] = &["detalles", "items", "lineas", "data"];

/// Candidate key paths for a line's product id.
const LINE_ID_CANDIDATES: &[&str] = &["idProducto", "productId", "id"];
/// Candidate key paths for a line's product name.
const LINE_NAME_CANDIDATES: &[&str] = &["nombreProducto", "nombre", "name"];
/// Candidate key paths for a line's unit price.
const LINE_PRICE_CANDIDATES: &[&str] = &["precioUnitario", "precio", "price"];
/// Candidate key paths for a line's quantity.
const LINE_QUANTITY_CANDIDATES: &[&str] = &["cantidad", "qty", "quantity"];
/// Candidate key paths for a line's subtotal.
const LINE_SUBTOTAL_CANDIDATES: &[&str] = &["subtotal", "total"];

/// Normalize one raw order record.
///
/// Returns `None` when no id candidate resolves. A missing subtotal is
/// recomputed from unit price and quantity.
#[must_use]
pub fn normalize_order(raw: &Value) -> Option<Order> {
    let id = resolve_id(Some(raw), ID_CANDIDATES)?;

    let lines = LINE_WRAPPERS
        .iter()
        .find_map(|key| raw.get(*key)?.as_array())
        .map_or_else(Vec::new, |items| {
            items.iter().filter_map(normalize_order_line).collect()
        });

    Some(Order {
        id: OrderId::new(id),
        total: resolve_decimal(Some(raw), TOTAL_CANDIDATES),
        placed_at: resolve_string(Some(raw), DATE_CANDIDATES),
        status: OrderStatus::from(resolve_string(Some(raw), STATUS_CANDIDATES)),
        lines,
    })
}

fn normalize_order_line(raw: &Value) -> Option<OrderLine> {
    let product_id = resolve_id(Some(raw), LINE_ID_CANDIDATES)?;
    let unit_price = resolve_decimal(Some(raw), LINE_PRICE_CANDIDATES);
    let quantity = resolve_quantity(Some(raw), LINE_QUANTITY_CANDIDATES);

    let subtotal = if resolve(Some(raw), LINE_SUBTOTAL_CANDIDATES).is_some() {
        resolve_decimal(Some(raw), LINE_SUBTOTAL_CANDIDATES)
    } else {
        unit_price * rust_decimal::Decimal::from(quantity)
    };

    Some(OrderLine {
        product_id: ProductId::new(product_id),
        name: resolve_string(Some(raw), LINE_NAME_CANDIDATES),
        unit_price,
        quantity,
        subtotal,
    })
}

/// Normalize an order listing response.
///
/// Accepts a bare array or an object wrapping one under
/// `orders`/`pedidos`/`data`. Orders without an id are skipped.
#[must_use]
pub fn normalize_order_list(raw: &Value) -> Vec<Order> {
    locate_array(raw, &["orders", "pedidos", "data"]).map_or_else(Vec::new, |items| {
        items.iter().filter_map(normalize_order).collect()
    })
}
