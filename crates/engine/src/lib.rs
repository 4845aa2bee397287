//! Mercadito reconciliation engine.
//!
//! The backend microservices (auth, catalog, cart, orders) return
//! inconsistent, loosely-shaped JSON: cart lines may arrive bare or
//! wrapped under `items`/`detalle`/`detalleCarrito`/`data`, product ids
//! show up as `id_producto`, `idProducto` or `productId`, and login
//! responses scatter identity across flat fields, a nested `user` object
//! and bearer-token claims. This crate owns the one place where those
//! shapes are reconciled into canonical entities.
//!
//! # Architecture
//!
//! - [`resolve`] - candidate-key-path resolution over raw JSON values
//! - [`normalize`] - product, category and cart-line normalizers
//! - [`snapshot`] - durable local cart mirror with delta application
//! - [`reconcile`] - server-vs-local cart merge policy
//! - [`session`] - identity extraction and the owned session context
//! - [`api`] - reqwest clients with endpoint-variant fallback
//! - [`events`] - `AuthChanged`/`CartChanged` broadcast
//!
//! Normalization never fails: malformed payloads degrade to defaults.
//! Only transport and terminal authorization failures surface as errors.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod normalize;
pub mod reconcile;
pub mod resolve;
pub mod session;
pub mod snapshot;

pub use api::{AuthApi, CartApi, CatalogApi, Engine, OrdersApi, ProductInput, SharedStore};
pub use config::EngineConfig;
pub use error::EngineError;
pub use events::{EngineEvent, EventBus};
