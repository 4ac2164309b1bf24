//! Lunette storefront list state.
//!
//! Compare and recently-viewed lists live in cookies; liked products live on
//! the commerce backend, scoped by the shopper's customer or guest id. The
//! crate is a library so the binary, the CLI and the integration tests share
//! one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod cookies;
pub mod error;
pub mod identity;
pub mod liked;
pub mod medusa;
pub mod middleware;
pub mod notifier;
pub mod routes;
pub mod state;
