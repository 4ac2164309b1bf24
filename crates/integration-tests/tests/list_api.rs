//! End-to-end tests for the list API against a mock commerce backend.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use lunette_integration_tests::{Browser, TestApp};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const GUEST_COOKIE: &str = "_medusa_guest_customer_id";
const COMPARE_COOKIE: &str = "_medusa_compare_ids";

fn ids(value: &Value) -> Vec<&str> {
    value["product_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap())
        .collect()
}

async fn mount_empty_liked(app: &TestApp) {
    Mock::given(method("GET"))
        .and(path("/store/liked-products"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"product_ids": [], "count": 0})),
        )
        .mount(&app.backend)
        .await;
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::start().await;
    let res = Browser::default().get(&app, "/health").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json, json!("ok"));
    assert!(res.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_readiness_follows_backend() {
    let app = TestApp::start().await;
    let mut browser = Browser::default();

    // Unmatched wiremock requests answer 404
    let res = browser.get(&app, "/health/ready").await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.backend)
        .await;

    let res = browser.get(&app, "/health/ready").await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_compare_add_readd_remove() {
    let app = TestApp::start().await;
    let mut browser = Browser::default();

    let res = browser.get(&app, "/api/compare").await;
    assert_eq!(res.json, json!({"product_ids": [], "count": 0}));

    let res = browser
        .post(&app, "/api/compare", json!({"product_id": "p1"}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["outcome"], "added");
    assert_eq!(ids(&res.json), ["p1"]);
    assert_eq!(res.event(), Some("compareUpdated"));
    assert_eq!(browser.cookie(COMPARE_COOKIE), Some("%5B%22p1%22%5D"));

    let res = browser
        .post(&app, "/api/compare", json!({"product_id": "p1"}))
        .await;
    assert_eq!(res.json["outcome"], "already_present");
    assert_eq!(ids(&res.json), ["p1"]);
    assert_eq!(res.event(), None);

    let res = browser.delete(&app, "/api/compare/p1").await;
    assert_eq!(res.json, json!({"product_ids": [], "count": 0}));
    assert_eq!(res.event(), Some("compareUpdated"));

    let res = browser.get(&app, "/api/compare").await;
    assert_eq!(res.json["count"], 0);
}

#[tokio::test]
async fn test_compare_refuses_when_full() {
    let app = TestApp::start().await;
    let mut browser = Browser::default();

    for n in 0..10 {
        browser
            .post(&app, "/api/compare", json!({"product_id": format!("p{n}")}))
            .await;
    }

    let res = browser
        .post(&app, "/api/compare", json!({"product_id": "p10"}))
        .await;
    assert_eq!(res.json["outcome"], "full");
    assert_eq!(res.json["count"], 10);
    assert_eq!(ids(&res.json)[0], "p0");
}

#[tokio::test]
async fn test_compare_clear() {
    let app = TestApp::start().await;
    let mut browser = Browser::default();

    browser
        .post(&app, "/api/compare", json!({"product_id": "p1"}))
        .await;
    let res = browser.delete(&app, "/api/compare").await;

    assert_eq!(res.json, json!({"product_ids": [], "count": 0}));
    assert_eq!(browser.cookie(COMPARE_COOKIE), Some("%5B%5D"));
}

#[tokio::test]
async fn test_malformed_compare_cookie_reads_empty_and_is_repaired() {
    let app = TestApp::start().await;
    let mut browser = Browser::default().with_cookie(COMPARE_COOKIE, "%7Bbroken");

    let res = browser.get(&app, "/api/compare").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["count"], 0);

    let res = browser
        .post(&app, "/api/compare", json!({"product_id": "p2"}))
        .await;
    assert_eq!(ids(&res.json), ["p2"]);
}

#[tokio::test]
async fn test_empty_product_id_is_rejected() {
    let app = TestApp::start().await;
    let res = Browser::default()
        .post(&app, "/api/compare", json!({"product_id": "  "}))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recently_viewed_most_recent_first() {
    let app = TestApp::start().await;
    let mut browser = Browser::default();

    for id in ["A", "B", "A", "C"] {
        let res = browser
            .post(
                &app,
                "/api/recently-viewed",
                json!({"id": id, "handle": id.to_lowercase(), "thumbnail": null, "title": id}),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.event(), None);
    }

    let res = browser.get(&app, "/api/recently-viewed").await;
    let order: Vec<&str> = res.json["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(order, ["C", "A", "B"]);
    assert_eq!(res.json["count"], 3);
}

#[tokio::test]
async fn test_recently_viewed_remove() {
    let app = TestApp::start().await;
    let mut browser = Browser::default();

    browser
        .post(
            &app,
            "/api/recently-viewed",
            json!({"id": "A", "handle": "a", "title": "Aviator"}),
        )
        .await;
    let res = browser.delete(&app, "/api/recently-viewed/A").await;

    assert_eq!(res.json, json!({"products": [], "count": 0}));
}

#[tokio::test]
async fn test_guest_id_is_minted_once_and_reused() {
    let app = TestApp::start().await;
    mount_empty_liked(&app).await;
    let mut browser = Browser::default();

    let first = browser.get(&app, "/api/liked").await;
    assert_eq!(first.set_cookie_names(), [GUEST_COOKIE]);
    let guest_id = browser.cookie(GUEST_COOKIE).unwrap().to_string();
    assert!(guest_id.starts_with("guest_"));

    let second = browser.get(&app, "/api/liked/prod_1").await;
    assert!(second.set_cookie_names().is_empty());
    assert_eq!(second.json, json!({"product_id": "prod_1", "liked": false}));

    let requests = app.backend.received_requests().await.unwrap();
    assert!(!requests.is_empty());
    for request in requests {
        let owner = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "customer_id")
            .map(|(_, value)| value.into_owned());
        assert_eq!(owner.as_deref(), Some(guest_id.as_str()));
    }
}

#[tokio::test]
async fn test_signed_in_customer_scopes_liked_products() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path("/store/customers/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"customer": {"id": "cus_1"}})),
        )
        .mount(&app.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/store/liked-products"))
        .and(query_param("customer_id", "cus_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"product_ids": ["prod_1"], "count": 1})),
        )
        .expect(1)
        .mount(&app.backend)
        .await;

    let mut browser = Browser::default().with_cookie("_medusa_jwt", "token");
    let res = browser.get(&app, "/api/liked").await;

    assert_eq!(res.json, json!({"product_ids": ["prod_1"], "count": 1}));
    assert!(browser.cookie(GUEST_COOKIE).is_none());
}

#[tokio::test]
async fn test_like_invalidates_cached_ids() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path("/store/liked-products"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"product_ids": [], "count": 0})),
        )
        .expect(2)
        .mount(&app.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/store/liked-products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&app.backend)
        .await;

    let mut browser = Browser::default();
    browser.get(&app, "/api/liked").await;
    browser.get(&app, "/api/liked").await;

    let res = browser
        .post(&app, "/api/liked", json!({"product_id": "prod_1"}))
        .await;
    assert_eq!(res.json, json!({"success": true}));
    assert_eq!(res.event(), Some("likedUpdated"));

    browser.get(&app, "/api/liked").await;
}

#[tokio::test]
async fn test_unlike_with_success_false_is_soft_failure() {
    let app = TestApp::start().await;
    Mock::given(method("DELETE"))
        .and(path("/store/liked-products"))
        .and(query_param("product_id", "prod_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "not liked"})),
        )
        .expect(1)
        .mount(&app.backend)
        .await;

    let res = Browser::default().delete(&app, "/api/liked/prod_1").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json, json!({"success": false}));
    assert_eq!(res.event(), None);
}

#[tokio::test]
async fn test_backend_down_reads_empty() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path("/store/liked-products"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.backend)
        .await;

    let res = Browser::default().get(&app, "/api/liked").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json, json!({"product_ids": [], "count": 0}));
}
