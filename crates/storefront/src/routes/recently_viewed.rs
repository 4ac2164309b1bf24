//! Recently viewed route handlers.
//!
//! Product pages post here on load. There is no change event for this list;
//! nothing on the page re-renders when it changes.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use lunette_core::RecentlyViewedProduct;
use serde::Serialize;
use tracing::instrument;

use super::{product_id, respond};
use crate::cookies::RecentlyViewedList;
use crate::error::{AppError, Result};
use crate::middleware::RequestCookies;
use crate::state::AppState;

/// Recently viewed products as returned to the client, most recent first.
#[derive(Debug, Serialize)]
pub struct RecentlyViewedView {
    pub products: Vec<RecentlyViewedProduct>,
    pub count: usize,
}

impl RecentlyViewedView {
    fn of(list: &RecentlyViewedList) -> Self {
        let products = list.read();
        Self {
            count: products.len(),
            products,
        }
    }
}

/// Recently viewed products.
#[instrument(skip(state, jar))]
pub async fn list(State(state): State<AppState>, RequestCookies(jar): RequestCookies) -> Response {
    let recent = state.recently_viewed(jar.clone());
    respond(&jar, None, Json(RecentlyViewedView::of(&recent)))
}

/// Record a product view.
#[instrument(skip(state, jar, product), fields(product_id = %product.id))]
pub async fn record(
    State(state): State<AppState>,
    RequestCookies(jar): RequestCookies,
    Json(product): Json<RecentlyViewedProduct>,
) -> Result<Response> {
    let id = product_id(product.id.as_str())?;
    if product.handle.trim().is_empty() {
        return Err(AppError::BadRequest("handle must not be empty".to_string()));
    }

    let recent = state.recently_viewed(jar.clone());
    recent.add(RecentlyViewedProduct { id, ..product })?;

    Ok(respond(&jar, None, Json(RecentlyViewedView::of(&recent))))
}

/// Forget one viewed product.
#[instrument(skip(state, jar))]
pub async fn remove(
    State(state): State<AppState>,
    RequestCookies(jar): RequestCookies,
    Path(raw_id): Path<String>,
) -> Result<Response> {
    let id = product_id(&raw_id)?;
    let recent = state.recently_viewed(jar.clone());

    recent.remove(id.as_str())?;

    Ok(respond(&jar, None, Json(RecentlyViewedView::of(&recent))))
}
