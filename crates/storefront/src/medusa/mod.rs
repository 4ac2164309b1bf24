//! Commerce backend (Medusa) store API client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`; every endpoint has an explicit response type
//!   from `lunette_core::wire`
//! - The backend is the source of truth for liked products; nothing is
//!   synced locally beyond the short-lived liked-id cache in `liked`
//!
//! # Endpoints
//!
//! ```text
//! GET    /store/customers/me                               - signed-in customer (bearer token)
//! GET    /store/liked-products?customer_id=ID              - {product_ids, count}
//! POST   /store/liked-products  {customer_id, product_id}  - {success, message?}
//! DELETE /store/liked-products?customer_id=ID&product_id=P - {success, message?}
//! GET    /health                                           - backend liveness
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use lunette_storefront::medusa::MedusaClient;
//!
//! let client = MedusaClient::new(&config.medusa)?;
//! let liked = client.liked_ids("guest_1718000000000_k3j9x0a1b").await?;
//! ```

mod client;

pub use client::MedusaClient;

use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum MedusaError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Backend parsed the request but reported `success: false`.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Client could not be built from configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
