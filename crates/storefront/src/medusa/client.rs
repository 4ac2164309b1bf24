//! Medusa store API client implementation.

use std::sync::Arc;

use async_trait::async_trait;
use lunette_core::{CustomerEnvelope, CustomerSummary, LikedIdsResponse, MutationResponse, ProductId};
use reqwest::RequestBuilder;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::MedusaError;
use crate::config::MedusaConfig;
use crate::identity::CustomerLookup;
use crate::liked::LikedBackend;

/// Header carrying the store API publishable key.
const PUBLISHABLE_KEY_HEADER: &str = "x-publishable-api-key";

/// Longest slice of a response body kept in errors and logs.
const BODY_SNIPPET_CHARS: usize = 200;

/// Client for the Medusa store API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct MedusaClient {
    inner: Arc<MedusaClientInner>,
}

struct MedusaClientInner {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct LikeRequest<'a> {
    customer_id: &'a str,
    product_id: &'a str,
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

impl MedusaClient {
    /// Create a new store API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the publishable key is not a valid header value or
    /// the HTTP client fails to build.
    pub fn new(config: &MedusaConfig) -> Result<Self, MedusaError> {
        let mut headers = HeaderMap::new();

        if let Some(key) = &config.publishable_key {
            headers.insert(
                PUBLISHABLE_KEY_HEADER,
                HeaderValue::from_str(key.expose_secret())
                    .map_err(|e| MedusaError::Config(format!("Invalid publishable key format: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(MedusaClientInner {
                client,
                base_url: config.backend_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and parse a JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, MedusaError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %snippet(&body),
                "Medusa API returned non-success status"
            );
            return Err(MedusaError::Api {
                status: status.as_u16(),
                message: snippet(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %snippet(&body),
                "Failed to parse Medusa API response"
            );
            MedusaError::Parse(e.to_string())
        })
    }

    /// Fetch the customer the bearer token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn current_customer(
        &self,
        token: &SecretString,
    ) -> Result<CustomerSummary, MedusaError> {
        let request = self
            .inner
            .client
            .get(self.url("/store/customers/me"))
            .bearer_auth(token.expose_secret());

        let envelope: CustomerEnvelope = self.send_json(request).await?;
        Ok(envelope.customer)
    }

    /// Liked product ids stored for `owner` (a customer or guest id).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn liked_ids(&self, owner: &str) -> Result<LikedIdsResponse, MedusaError> {
        let request = self
            .inner
            .client
            .get(self.url("/store/liked-products"))
            .query(&[("customer_id", owner)]);

        self.send_json(request).await
    }

    /// Record that `owner` likes `product_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed. A
    /// parsed `success: false` body is returned as-is.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn like(
        &self,
        owner: &str,
        product_id: &ProductId,
    ) -> Result<MutationResponse, MedusaError> {
        let request = self
            .inner
            .client
            .post(self.url("/store/liked-products"))
            .json(&LikeRequest {
                customer_id: owner,
                product_id: product_id.as_str(),
            });

        self.send_json(request).await
    }

    /// Remove `product_id` from `owner`'s liked products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed. A
    /// parsed `success: false` body is returned as-is.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn unlike(
        &self,
        owner: &str,
        product_id: &ProductId,
    ) -> Result<MutationResponse, MedusaError> {
        let request = self
            .inner
            .client
            .delete(self.url("/store/liked-products"))
            .query(&[("customer_id", owner), ("product_id", product_id.as_str())]);

        self.send_json(request).await
    }

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend does not answer with a success status.
    pub async fn health(&self) -> Result<(), MedusaError> {
        let response = self.inner.client.get(self.url("/health")).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(MedusaError::Api {
                status: status.as_u16(),
                message: "health check failed".to_string(),
            })
        }
    }
}

#[async_trait]
impl CustomerLookup for MedusaClient {
    async fn current_customer(
        &self,
        token: &SecretString,
    ) -> Result<CustomerSummary, MedusaError> {
        Self::current_customer(self, token).await
    }
}

#[async_trait]
impl LikedBackend for MedusaClient {
    async fn liked_ids(&self, owner: &str) -> Result<LikedIdsResponse, MedusaError> {
        Self::liked_ids(self, owner).await
    }

    async fn like(
        &self,
        owner: &str,
        product_id: &ProductId,
    ) -> Result<MutationResponse, MedusaError> {
        Self::like(self, owner, product_id).await
    }

    async fn unlike(
        &self,
        owner: &str,
        product_id: &ProductId,
    ) -> Result<MutationResponse, MedusaError> {
        Self::unlike(self, owner, product_id).await
    }
}
