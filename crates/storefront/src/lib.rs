//! Sabor Storefront - terminal client for the Sabor & Fuego backend.
//!
//! This crate provides the client as a library so that the `sabor` binary,
//! the interactive shell and the integration tests share one implementation.
//!
//! # Modules
//!
//! - [`api`] - HTTP gateway to the backend
//! - [`storage`] - Durable storage scope backed by a JSON file
//! - [`services`] - Auth, catalog, cashier and health flows
//! - [`state`] - Everything one client process owns
//! - [`views`] - Terminal rendering
//! - [`shell`] - Command parsing and dispatch

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod services;
pub mod shell;
pub mod state;
pub mod storage;
pub mod views;
