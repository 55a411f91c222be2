//! Business logic services for the storefront client.
//!
//! # Services
//!
//! - `auth` - Sign-in, registration and sign-out
//! - `catalog` - Products, users, offers and carousels
//! - `cashier` - Register ticket and remote order inbox
//! - `health` - Backend reachability
//! - `modules` - Staff modules menu by role

pub mod auth;
pub mod cashier;
pub mod catalog;
pub mod health;
pub mod modules;
