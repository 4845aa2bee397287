//! Command implementations, one module per domain.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod session;
