//! Server-vs-local cart reconciliation.
//!
//! The precedence here is deliberately asymmetric and must stay that way:
//!
//! - Line content: server wins whenever it yields one or more lines; the
//!   local snapshot is a fallback display source only. Always trusting the
//!   server would flash an empty cart during transient 500s; always
//!   trusting local would never reflect server-side merges from other
//!   devices.
//! - Badge count: the maximum of server-derived and local-derived counts,
//!   so the badge never shows fewer items than either source knows about
//!   while a slow or failing round trip is in flight.

use rust_decimal::Decimal;
use serde_json::Value;

use mercadito_core::{CartViewLine, LocalSnapshotEntry, Product, ProductId};

use crate::error::EngineError;
use crate::normalize::{compute_total, server_total};

/// Merge server cart state with the local snapshot.
///
/// `server` is the normalized outcome of the cart fetch: lines, or the
/// error it failed with. `lookup` resolves display fields from the
/// currently known catalog; products the catalog no longer knows get the
/// placeholder name `"Producto {id}"` and price zero.
pub fn reconcile(
    server: Result<Vec<CartViewLine>, &EngineError>,
    snapshot: &[LocalSnapshotEntry],
    lookup: impl Fn(ProductId) -> Option<Product>,
) -> Vec<CartViewLine> {
    match server {
        // A non-empty server cart is authoritative.
        Ok(lines) if !lines.is_empty() => lines,
        // Errored, empty or unrecognizable: rebuild from the snapshot.
        Ok(_) | Err(_) => hydrate_from_snapshot(snapshot, lookup),
    }
}

/// Build view lines from the local snapshot, resolving display fields via
/// the catalog lookup.
fn hydrate_from_snapshot(
    snapshot: &[LocalSnapshotEntry],
    lookup: impl Fn(ProductId) -> Option<Product>,
) -> Vec<CartViewLine> {
    snapshot
        .iter()
        .map(|entry| match lookup(entry.product_id) {
            Some(product) => CartViewLine {
                product_id: entry.product_id,
                name: product.name,
                unit_price: product.price,
                quantity: entry.quantity,
                image_url: product.image_url,
            },
            None => CartViewLine {
                product_id: entry.product_id,
                name: format!("Producto {}", entry.product_id),
                unit_price: Decimal::ZERO,
                quantity: entry.quantity,
                image_url: String::new(),
            },
        })
        .collect()
}

/// Badge count: never smaller than either source.
#[must_use]
pub const fn badge_count(server_count: u32, local_count: u32) -> u32 {
    if server_count > local_count {
        server_count
    } else {
        local_count
    }
}

/// Displayed cart total: the server-supplied total when it parses
/// numerically, otherwise the client-computed sum over `lines`.
#[must_use]
pub fn display_total(raw: Option<&Value>, lines: &[CartViewLine]) -> Decimal {
    raw.and_then(server_total)
        .unwrap_or_else(|| compute_total(lines))
}
