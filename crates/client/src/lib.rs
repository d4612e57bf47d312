//! Copperpot client - the commerce state layer.
//!
//! This crate owns every piece of storefront state with non-trivial
//! invariants: the shopping cart, the session, the checkout handoff, and
//! the authorization gate. Presentation layers (the CLI today) are thin
//! I/O wrappers that call into this crate and render whatever it returns.
//!
//! # Modules
//!
//! - [`storage`] - Durable key-value client storage (file-backed or in-memory)
//! - [`session`] - Session store: token, role, display name
//! - [`cart`] - Cart store: line items, stock ceilings, totals, persistence
//! - [`checkout`] - Checkout orchestrator: cart snapshot to remote order
//! - [`gate`] - Access gate: per-view authorization decisions
//! - [`api`] - Authenticated HTTP client for the remote catalog/order service
//! - [`config`] - Environment-driven configuration
//! - [`state`] - [`AppState`](state::AppState) wiring it all together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod gate;
pub mod models;
pub mod session;
pub mod state;
pub mod storage;

pub use error::{AppError, Result};
pub use state::AppState;
