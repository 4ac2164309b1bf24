//! Liked products route handlers.
//!
//! Backend failures are not HTTP errors here: mutations answer
//! `200 {"success": false}` and reads answer an empty list, so the page
//! keeps working when the backend does not.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use lunette_core::{ListKind, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{product_id, respond};
use crate::cookies::RequestCookieJar;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequestCookies;
use crate::state::AppState;

/// Body of `POST /api/liked`.
#[derive(Debug, Deserialize)]
pub struct LikeProduct {
    pub product_id: String,
}

/// Liked ids as returned to the client.
#[derive(Debug, Serialize)]
pub struct LikedView {
    pub product_ids: Vec<ProductId>,
    pub count: usize,
}

/// Whether one product is liked.
#[derive(Debug, Serialize)]
pub struct LikedStatus {
    pub product_id: ProductId,
    pub liked: bool,
}

/// Result of a like or unlike.
#[derive(Debug, Serialize)]
pub struct MutationResult {
    pub success: bool,
}

fn mutation_response(jar: &RequestCookieJar, success: bool) -> Response {
    let changed = success.then_some(ListKind::Liked);
    respond(jar, changed, Json(MutationResult { success }))
}

/// Every liked product id of the current shopper.
#[instrument(skip(state, jar))]
pub async fn list(State(state): State<AppState>, RequestCookies(jar): RequestCookies) -> Response {
    let product_ids = state.liked_products(jar.clone()).list_liked_ids().await;

    respond(
        &jar,
        None,
        Json(LikedView {
            count: product_ids.len(),
            product_ids,
        }),
    )
}

/// Whether the current shopper likes a product.
#[instrument(skip(state, jar))]
pub async fn status(
    State(state): State<AppState>,
    RequestCookies(jar): RequestCookies,
    Path(raw_id): Path<String>,
) -> Result<Response> {
    let product_id = product_id(&raw_id)?;
    let liked = state.liked_products(jar.clone()).is_liked(&product_id).await;

    Ok(respond(&jar, None, Json(LikedStatus { product_id, liked })))
}

/// Like a product.
#[instrument(skip(state, jar, body), fields(product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequestCookies(jar): RequestCookies,
    Json(body): Json<LikeProduct>,
) -> Result<Response> {
    let id = product_id(&body.product_id)?;
    let success = state.liked_products(jar.clone()).add_liked(&id).await;

    if success {
        add_breadcrumb("liked", "Liked product", Some(&[("product_id", id.as_str())]));
    }

    Ok(mutation_response(&jar, success))
}

/// Unlike a product.
#[instrument(skip(state, jar))]
pub async fn remove(
    State(state): State<AppState>,
    RequestCookies(jar): RequestCookies,
    Path(raw_id): Path<String>,
) -> Result<Response> {
    let id = product_id(&raw_id)?;
    let success = state.liked_products(jar.clone()).remove_liked(&id).await;

    if success {
        add_breadcrumb(
            "liked",
            "Unliked product",
            Some(&[("product_id", id.as_str())]),
        );
    }

    Ok(mutation_response(&jar, success))
}
