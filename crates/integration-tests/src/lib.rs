//! Integration tests for Mercadito.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mercadito-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - snapshot, normalization and reconciliation end to end
//! - `session_flow` - login payload shapes, roles, expiry, lifecycle
//! - `payload_shapes` - normalizer behavior across the backend's shapes
//!
//! Everything here runs against in-memory stores and canned payloads; no
//! backend services are required.
