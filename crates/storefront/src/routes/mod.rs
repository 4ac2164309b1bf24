//! HTTP route handlers for the storefront list API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness check
//! GET    /health/ready                  - Readiness (commerce backend reachable)
//!
//! # Compare (cookie)
//! GET    /api/compare                   - {product_ids, count}
//! POST   /api/compare                   - Add {product_id}, returns list and outcome
//! DELETE /api/compare                   - Clear
//! DELETE /api/compare/{product_id}      - Remove one
//!
//! # Recently viewed (cookie)
//! GET    /api/recently-viewed           - {products, count}
//! POST   /api/recently-viewed           - Record a view {id, handle, thumbnail, title}
//! DELETE /api/recently-viewed/{id}      - Forget one
//!
//! # Liked (commerce backend)
//! GET    /api/liked                     - {product_ids, count}
//! POST   /api/liked                     - Like {product_id}, returns {success}
//! GET    /api/liked/{product_id}        - {product_id, liked}
//! DELETE /api/liked/{product_id}        - Unlike, returns {success}
//! ```
//!
//! Cookie writes made while handling a request come back as `Set-Cookie`
//! headers. Successful mutations also carry an `HX-Trigger` header naming
//! the list event (`compareUpdated`, `likedUpdated`, ...).

pub mod compare;
pub mod liked;
pub mod recently_viewed;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderName, Request, StatusCode},
    middleware,
    response::{AppendHeaders, IntoResponse, Response},
    routing::{delete, get},
};
use lunette_core::{ListKind, ProductId};
use tower_http::trace::TraceLayer;

use crate::cookies::RequestCookieJar;
use crate::error::{AppError, Result};
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Header naming the client-side event a mutation should fire.
const EVENT_TRIGGER_HEADER: &str = "hx-trigger";

/// Create the compare routes router.
pub fn compare_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(compare::list).post(compare::add).delete(compare::clear),
        )
        .route("/{product_id}", delete(compare::remove))
}

/// Create the recently viewed routes router.
pub fn recently_viewed_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(recently_viewed::list).post(recently_viewed::record))
        .route("/{product_id}", delete(recently_viewed::remove))
}

/// Create the liked routes router.
pub fn liked_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(liked::list).post(liked::add))
        .route("/{product_id}", get(liked::status).delete(liked::remove))
}

/// Create all `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/compare", compare_routes())
        .nest("/recently-viewed", recently_viewed_routes())
        .nest("/liked", liked_routes())
}

/// Build the full application router.
///
/// Sentry layers are added by the binary on top of this.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the commerce backend is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.medusa().health().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Commerce backend not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Attach the jar's pending cookies (and the change event, if any) to `body`.
fn respond(jar: &RequestCookieJar, changed: Option<ListKind>, body: impl IntoResponse) -> Response {
    let mut headers = jar.set_cookie_headers();
    if let Some(kind) = changed {
        headers.push((
            HeaderName::from_static(EVENT_TRIGGER_HEADER),
            kind.event_name().to_string(),
        ));
    }

    (AppendHeaders(headers), body).into_response()
}

/// Validate a product id taken from a path or body.
fn product_id(raw: &str) -> Result<ProductId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(
            "product_id must not be empty".to_string(),
        ));
    }
    Ok(ProductId::new(trimmed))
}
