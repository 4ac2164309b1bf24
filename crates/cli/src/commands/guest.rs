//! Guest id commands.
//!
//! # Usage
//!
//! ```bash
//! # Mint a guest id the way the storefront does
//! lunette-cli guest-id
//!
//! # Inspect an existing one
//! lunette-cli guest-id --parse guest_1718000000000_k3j9x0a1b
//! ```

use chrono::{DateTime, Utc};
use lunette_core::{GuestId, GuestIdError};
use lunette_storefront::identity::generate_guest_id;

/// Mint a new guest id and log it.
///
/// # Errors
///
/// Returns an error if the generated id does not validate.
pub fn mint() -> Result<(), GuestIdError> {
    let id = generate_guest_id(Utc::now(), &mut rand::rng())?;
    tracing::info!(guest_id = %id, "Generated guest id");
    Ok(())
}

/// Parse a guest id and log when it was minted.
///
/// # Errors
///
/// Returns an error if `raw` is not a valid guest id.
pub fn inspect(raw: &str) -> Result<(), GuestIdError> {
    let id = GuestId::parse(raw)?;
    let created_at = i64::try_from(id.created_at_millis())
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis);

    match created_at {
        Some(at) => tracing::info!(guest_id = %id, created_at = %at.to_rfc3339(), "Valid guest id"),
        None => tracing::info!(guest_id = %id, "Valid guest id with out-of-range timestamp"),
    }
    Ok(())
}
