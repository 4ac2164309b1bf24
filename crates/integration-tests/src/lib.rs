//! Integration test harness for the Lunette storefront list API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lunette-integration-tests
//! ```
//!
//! No external services are needed: the commerce backend is a `wiremock`
//! server and requests go straight into the router with
//! `tower::ServiceExt::oneshot`.
//!
//! # Example
//!
//! ```rust,ignore
//! let app = TestApp::start().await;
//! let mut browser = Browser::default();
//!
//! let res = browser.post(&app, "/api/compare", json!({"product_id": "p1"})).await;
//! assert_eq!(res.json["count"], 1);
//! ```

use std::collections::BTreeMap;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use cookie::Cookie;
use lunette_storefront::config::StorefrontConfig;
use lunette_storefront::routes;
use lunette_storefront::state::AppState;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

/// A storefront router wired to a mock commerce backend.
pub struct TestApp {
    /// Mock commerce backend; mount expectations on it.
    pub backend: MockServer,
    router: Router,
}

impl TestApp {
    /// Start a mock backend and build the storefront against it.
    pub async fn start() -> Self {
        let backend = MockServer::start().await;
        let config = StorefrontConfig::for_backend(&backend.uri());
        let state = AppState::new(config).expect("Failed to build app state");

        Self {
            router: routes::router(state),
            backend,
        }
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Body parsed as JSON, or a JSON string holding the raw text.
    pub json: Value,
}

impl TestResponse {
    /// Names of the cookies set by this response.
    #[must_use]
    pub fn set_cookie_names(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| Cookie::parse(value.to_string()).ok())
            .map(|cookie| cookie.name().to_string())
            .collect()
    }

    /// The list event named by the response, if any.
    #[must_use]
    pub fn event(&self) -> Option<&str> {
        self.headers.get("hx-trigger")?.to_str().ok()
    }
}

/// Cookie-keeping client, standing in for one shopper's browser.
#[derive(Debug, Default)]
pub struct Browser {
    cookies: BTreeMap<String, String>,
}

impl Browser {
    /// A browser that already holds `name=value`.
    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_string(), value.to_string());
        self
    }

    /// Current value of a cookie.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// `GET path`.
    pub async fn get(&mut self, app: &TestApp, path: &str) -> TestResponse {
        self.send(app, Method::GET, path, None).await
    }

    /// `POST path` with a JSON body.
    pub async fn post(&mut self, app: &TestApp, path: &str, body: Value) -> TestResponse {
        self.send(app, Method::POST, path, Some(body)).await
    }

    /// `DELETE path`.
    pub async fn delete(&mut self, app: &TestApp, path: &str) -> TestResponse {
        self.send(app, Method::DELETE, path, None).await
    }

    /// Send a request, then store every cookie the response sets.
    pub async fn send(
        &mut self,
        app: &TestApp,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if !self.cookies.is_empty() {
            let header_value = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, header_value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let json = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        self.store_cookies(&headers);

        TestResponse {
            status,
            headers,
            json,
        }
    }

    fn store_cookies(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(header::SET_COOKIE) {
            let Some(cookie) = value
                .to_str()
                .ok()
                .and_then(|raw| Cookie::parse(raw.to_string()).ok())
            else {
                continue;
            };

            if cookie.max_age().is_some_and(|age| age.is_zero()) {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
    }
}
