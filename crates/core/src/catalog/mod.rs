//! Catalog records served by the backend and the client-side views over them.
//!
//! # Modules
//!
//! - [`filter`] - Product list filtering, category listing and grouping

pub mod filter;
mod product;

pub use filter::{
    DEFAULT_MAX_PRICE, ProductFilter, UNCATEGORIZED, available_categories, group_by_category,
    normalize, parse_price_bound,
};
pub use product::{Category, Menu, Product, ProductImage, Purchasable};
