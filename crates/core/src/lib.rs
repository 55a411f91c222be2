//! Sabor Core - Shared types and client-side state containers.
//!
//! This crate provides the pieces of the Sabor storefront that hold state on
//! the client:
//! - [`session`] - the authenticated identity and its two storage scopes
//! - [`cart`] - the shopping cart (volatile, memory only)
//! - [`pos`] - the cashier point-of-sale ticket and pending order queue
//!
//! # Architecture
//!
//! The core crate contains only types, traits and synchronous state reducers -
//! no network access and no filesystem access. Storage backends that touch the
//! disk live in the storefront crate and plug in through
//! [`session::Storage`].
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, roles and statuses
//! - [`catalog`] - Backend catalog records, filtering and grouping
//! - [`pricing`] - Discount projection
//! - [`fetch`] - Guard against late results for torn-down views

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod fetch;
pub mod pos;
pub mod pricing;
pub mod session;
pub mod types;

pub use cart::{Cart, CartError, CartLine, LineKey};
pub use catalog::{Menu, Product, Purchasable};
pub use session::{Identity, MemoryStorage, SessionStore, Storage, StorageError};
pub use types::*;
