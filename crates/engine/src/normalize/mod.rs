//! Payload normalizers: raw JSON in, canonical entities out.
//!
//! Split by domain to keep candidate lists close to the shapes they cover.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{compute_total, extract_count, normalize_cart_response, server_total};
pub use order::{normalize_order, normalize_order_list};
pub use product::{
    derive_categories, normalize_category_list, normalize_product, normalize_product_list,
};
