//! Response payloads of the commerce backend endpoints used for list state.
//!
//! Every endpoint gets its own explicit type; unknown fields are ignored and
//! missing optional fields fall back to their defaults, so the boundary
//! narrows whatever JSON comes back into a known shape.

use serde::{Deserialize, Serialize};

use crate::{CustomerId, ProductId};

/// Body of `GET /store/liked-products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikedIdsResponse {
    /// Liked product ids for the requested identity.
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
    /// Number of liked products as reported by the backend.
    #[serde(default)]
    pub count: usize,
}

/// Body of liked-product mutations (`POST` / `DELETE`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Whether the backend applied the mutation.
    #[serde(default)]
    pub success: bool,
    /// Optional explanation, usually present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `GET /store/customers/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerEnvelope {
    /// The signed-in customer.
    pub customer: CustomerSummary,
}

/// The fields of a customer record this crate cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    /// Customer ID.
    pub id: CustomerId,
    /// Customer email, if the backend includes it.
    #[serde(default)]
    pub email: Option<String>,
}
