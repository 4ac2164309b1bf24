//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Cookie state is not a layer: handlers take a [`RequestCookies`] extractor
//! and return the jar's pending `Set-Cookie` headers with their response.

pub mod cookies;
pub mod request_id;

pub use cookies::RequestCookies;
pub use request_id::request_id_middleware;
