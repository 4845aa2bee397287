//! Mercadito Core - Shared types library.
//!
//! This crate provides the canonical entities used across all Mercadito
//! components:
//! - `engine` - Response reconciliation engine (normalizers, snapshot, session)
//! - `cli` - Command-line smoke tools against live backend services
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Every raw
//! payload variant the backend services emit is normalized into exactly one
//! of these shapes, with every field populated with a type-correct default,
//! so downstream consumers never branch on absence.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and the canonical `Product`, `CartLine`,
//!   `SessionIdentity` entities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
