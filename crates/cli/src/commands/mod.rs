//! CLI command implementations.
//!
//! Each function is a "view": it reads or mutates the state layer and
//! renders the result as plain text. No invariants live here.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
