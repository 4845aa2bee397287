//! End-to-end cart flows: snapshot writes, payload normalization and
//! server-vs-local reconciliation, without any backend.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use mercadito_core::{Product, ProductId};
use mercadito_engine::normalize::{extract_count, normalize_cart_response};
use mercadito_engine::reconcile::{badge_count, display_total, reconcile};
use mercadito_engine::snapshot::{MemoryStore, SnapshotStore};

fn product(id: i64, name: &str, price: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Decimal::from(price),
        description: String::new(),
        category: String::new(),
        brand: String::new(),
        image_url: String::new(),
    }
}

// =============================================================================
// Happy path: server answers, server wins
// =============================================================================

#[test]
fn test_server_lines_win_over_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let snapshot = SnapshotStore::new(Arc::clone(&store));

    // Two confirmed adds mirrored locally.
    snapshot.add(ProductId::new(3), 1);
    snapshot.add(ProductId::new(9), 5);

    // The server has meanwhile merged those into its own view.
    let payload = json!({
        "detalleCarrito": [
            { "idProducto": 3, "cantidad": 2, "precioEspecial": 80, "precio": 100 },
            { "idProducto": 9, "cantidad": 5, "precio": 15 }
        ],
        "total": 235
    });

    let lines = normalize_cart_response(&payload);
    let view = reconcile(Ok(lines), &snapshot.read_all(), |_| None);

    assert_eq!(view.len(), 2);
    // precioEspecial outranks precio
    assert_eq!(view[0].unit_price, Decimal::from(80));
    assert_eq!(view[1].quantity, 5);
    assert_eq!(display_total(Some(&payload), &view), Decimal::from(235));
}

// =============================================================================
// Degraded path: service down, snapshot carries the display
// =============================================================================

#[test]
fn test_snapshot_carries_cart_when_service_fails() {
    let store = Arc::new(MemoryStore::new());
    let snapshot = SnapshotStore::new(Arc::clone(&store));

    snapshot.add(ProductId::new(7), 2);

    let catalog = [product(7, "Shoe", 20)];
    let err = mercadito_engine::EngineError::Status { status: 500 };
    let view = reconcile(Err(&err), &snapshot.read_all(), |id| {
        catalog.iter().find(|p| p.id == id).cloned()
    });

    assert_eq!(view.len(), 1);
    assert_eq!(view[0].name, "Shoe");
    assert_eq!(view[0].quantity, 2);
    assert_eq!(display_total(None, &view), Decimal::from(40));
}

#[test]
fn test_unknown_product_gets_placeholder() {
    let store = Arc::new(MemoryStore::new());
    let snapshot = SnapshotStore::new(Arc::clone(&store));
    snapshot.add(ProductId::new(42), 1);

    let err = mercadito_engine::EngineError::Status { status: 503 };
    let view = reconcile(Err(&err), &snapshot.read_all(), |_| None);

    assert_eq!(view[0].name, "Producto 42");
    assert_eq!(view[0].unit_price, Decimal::ZERO);
}

#[test]
fn test_empty_server_cart_falls_back_to_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let snapshot = SnapshotStore::new(Arc::clone(&store));
    snapshot.add(ProductId::new(1), 3);

    // An empty list is indistinguishable from "cart endpoint returned
    // something we couldn't read", so the snapshot still shows.
    let view = reconcile(Ok(Vec::new()), &snapshot.read_all(), |_| None);
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].quantity, 3);
}

// =============================================================================
// Badge
// =============================================================================

#[test]
fn test_badge_never_undercounts() {
    // Server momentarily reports fewer items than we know we added.
    assert_eq!(badge_count(1, 4), 4);
    assert_eq!(badge_count(6, 4), 6);
}

#[test]
fn test_badge_count_from_varied_payloads() {
    assert_eq!(
        extract_count(&json!([{ "cantidad": 2 }, { "cantidad": 3 }])),
        5
    );
    // A line with no quantity key still counts as one unit.
    assert_eq!(
        extract_count(&json!({ "items": [{ "cantidad": 2 }, {}] })),
        3
    );
    assert_eq!(extract_count(&json!({ "products": [{ "cantidad": 2 }] })), 2);
    assert_eq!(extract_count(&json!("garbage")), 0);
}

// =============================================================================
// Snapshot lifecycle across "page loads"
// =============================================================================

#[test]
fn test_snapshot_survives_reopening_the_store() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());

    {
        let snapshot = SnapshotStore::new(Arc::clone(&store));
        snapshot.add(ProductId::new(5), 2);
        snapshot.add(ProductId::new(5), 1);
        snapshot.set(ProductId::new(8), 4);
    }

    // A fresh wrapper over the same backing store sees the same state.
    let reopened = SnapshotStore::new(store);
    assert_eq!(reopened.count(), 7);

    reopened.add(ProductId::new(5), -3);
    assert_eq!(reopened.count(), 4);
    assert!(reopened.read_all().iter().all(|e| e.product_id != ProductId::new(5)));

    reopened.clear();
    assert_eq!(reopened.count(), 0);
}
