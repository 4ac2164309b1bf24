//! Request-scoped cookie jar extractor.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::cookies::RequestCookieJar;

/// Cookies of the current request.
///
/// Stores built on this jar read the request's cookies and queue their
/// writes; the handler returns [`RequestCookieJar::set_cookie_headers`]
/// alongside its body.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     State(state): State<AppState>,
///     RequestCookies(jar): RequestCookies,
/// ) -> impl IntoResponse {
///     let ids = state.compare_list(jar.clone()).read();
///     (AppendHeaders(jar.set_cookie_headers()), Json(ids))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestCookies(pub Arc<RequestCookieJar>);

impl<S> FromRequestParts<S> for RequestCookies
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(Arc::new(RequestCookieJar::from_headers(&parts.headers))))
    }
}
