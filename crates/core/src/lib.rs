//! Lunette Core - Shared list-state types.
//!
//! This crate provides the types shared by the Lunette components:
//! - `storefront` - Cookie-backed and remote list stores plus the JSON API
//! - `cli` - Command-line tools for inspecting list state
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no cookie jars,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product/customer IDs, list entries, identities and the
//!   backend wire payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
