//! Liked products commands, talking to the commerce backend directly.
//!
//! # Usage
//!
//! ```bash
//! lunette-cli liked list cus_01HZX
//! lunette-cli liked add guest_1718000000000_k3j9x0a1b prod_01J
//! lunette-cli liked remove guest_1718000000000_k3j9x0a1b prod_01J
//! ```
//!
//! # Environment Variables
//!
//! - `MEDUSA_BACKEND_URL` - Base URL of the commerce backend
//! - `MEDUSA_PUBLISHABLE_KEY` - Store API publishable key (optional)

use lunette_core::{MutationResponse, ProductId};
use lunette_storefront::config::{ConfigError, MedusaConfig};
use lunette_storefront::medusa::{MedusaClient, MedusaError};
use thiserror::Error;

/// Errors that can occur during liked-product operations.
#[derive(Debug, Error)]
pub enum LikedError {
    /// Backend configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The backend call failed.
    #[error("Backend error: {0}")]
    Medusa(#[from] MedusaError),

    /// The backend answered `success: false`.
    #[error("Backend refused the change: {0}")]
    Refused(String),
}

fn client() -> Result<MedusaClient, LikedError> {
    let config = MedusaConfig::from_env()?;
    Ok(MedusaClient::new(&config)?)
}

fn check(response: MutationResponse) -> Result<(), LikedError> {
    if response.success {
        Ok(())
    } else {
        Err(LikedError::Refused(
            response.message.unwrap_or_else(|| "no message".to_string()),
        ))
    }
}

/// Log every liked product of `owner`.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached.
pub async fn list(owner: &str) -> Result<(), LikedError> {
    let liked = client()?.liked_ids(owner).await?;

    tracing::info!(owner, count = liked.count, "Liked products");
    for id in &liked.product_ids {
        tracing::info!(product_id = %id, "Liked");
    }
    Ok(())
}

/// Like `product_id` on behalf of `owner`.
///
/// # Errors
///
/// Returns an error if the backend fails or refuses.
pub async fn add(owner: &str, product_id: &str) -> Result<(), LikedError> {
    let product_id = ProductId::new(product_id);
    check(client()?.like(owner, &product_id).await?)?;

    tracing::info!(owner, product_id = %product_id, "Product liked");
    Ok(())
}

/// Unlike `product_id` on behalf of `owner`.
///
/// # Errors
///
/// Returns an error if the backend fails or refuses.
pub async fn remove(owner: &str, product_id: &str) -> Result<(), LikedError> {
    let product_id = ProductId::new(product_id);
    check(client()?.unlike(owner, &product_id).await?)?;

    tracing::info!(owner, product_id = %product_id, "Product unliked");
    Ok(())
}
