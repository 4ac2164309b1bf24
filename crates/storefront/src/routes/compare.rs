//! Compare list route handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use lunette_core::{ListKind, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{product_id, respond};
use crate::cookies::{AddOutcome, CompareList};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequestCookies;
use crate::state::AppState;

/// Body of `POST /api/compare`.
#[derive(Debug, Deserialize)]
pub struct AddToCompare {
    pub product_id: String,
}

/// Compare list as returned to the client.
#[derive(Debug, Serialize)]
pub struct CompareView {
    pub product_ids: Vec<ProductId>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AddOutcome>,
}

impl CompareView {
    fn of(list: &CompareList) -> Self {
        let product_ids = list.read();
        Self {
            count: product_ids.len(),
            product_ids,
            outcome: None,
        }
    }
}

/// Current compare selection.
#[instrument(skip(state, jar))]
pub async fn list(State(state): State<AppState>, RequestCookies(jar): RequestCookies) -> Response {
    let compare = state.compare_list(jar.clone());
    respond(&jar, None, Json(CompareView::of(&compare)))
}

/// Add a product to the compare selection.
///
/// Adding a product that is already selected, or adding to a full
/// selection, leaves the cookie untouched and reports why in `outcome`.
#[instrument(skip(state, jar, body), fields(product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequestCookies(jar): RequestCookies,
    Json(body): Json<AddToCompare>,
) -> Result<Response> {
    let id = product_id(&body.product_id)?;
    let compare = state.compare_list(jar.clone());

    let outcome = compare.add(id.clone())?;
    add_breadcrumb(
        "compare",
        "Add to compare",
        Some(&[("product_id", id.as_str())]),
    );

    let changed = (outcome == AddOutcome::Added).then_some(ListKind::Compare);
    let view = CompareView {
        outcome: Some(outcome),
        ..CompareView::of(&compare)
    };

    Ok(respond(&jar, changed, Json(view)))
}

/// Remove a product from the compare selection.
#[instrument(skip(state, jar))]
pub async fn remove(
    State(state): State<AppState>,
    RequestCookies(jar): RequestCookies,
    Path(raw_id): Path<String>,
) -> Result<Response> {
    let id = product_id(&raw_id)?;
    let compare = state.compare_list(jar.clone());

    compare.remove(id.as_str())?;
    add_breadcrumb(
        "compare",
        "Remove from compare",
        Some(&[("product_id", id.as_str())]),
    );

    Ok(respond(
        &jar,
        Some(ListKind::Compare),
        Json(CompareView::of(&compare)),
    ))
}

/// Empty the compare selection.
#[instrument(skip(state, jar))]
pub async fn clear(
    State(state): State<AppState>,
    RequestCookies(jar): RequestCookies,
) -> Result<Response> {
    let compare = state.compare_list(jar.clone());

    compare.clear()?;
    add_breadcrumb("compare", "Clear compare", None);

    Ok(respond(
        &jar,
        Some(ListKind::Compare),
        Json(CompareView::of(&compare)),
    ))
}
