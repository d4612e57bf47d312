//! Copperpot Core - Shared types library.
//!
//! This crate provides common types used across all Copperpot components:
//! - `client` - The commerce state layer (cart, session, checkout, gate)
//! - `cli` - Command-line storefront front-end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
