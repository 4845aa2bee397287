//! Core types for Mercadito.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod order;
pub mod product;
pub mod session;

pub use cart::{CartLine, CartViewLine, LocalSnapshotEntry};
pub use id::*;
pub use order::{Order, OrderLine, OrderStatus};
pub use product::{Category, Product};
pub use session::SessionIdentity;
