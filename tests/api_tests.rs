use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::json;
use tokio::sync::Notify;

use menu_recommender::{
    error::AppResult,
    models::{ItemCatalog, OrderRecord},
    routes::{create_router, AppState},
    services::{
        recommendations::RecommendationLimits,
        sources::{InMemorySource, OrderDataSource},
    },
};

const LIMITS: RecommendationLimits = RecommendationLimits {
    default_count: 5,
    max_count: 10,
};

fn orders() -> Vec<OrderRecord> {
    vec![
        OrderRecord::new(1, vec![1, 2]),
        OrderRecord::new(1, vec![1]),
        OrderRecord::new(2, vec![1, 2, 3]),
        OrderRecord::new(3, vec![1, 3, 4]),
        OrderRecord::new(4, vec![4, 5]),
        OrderRecord::new(5, vec![2, 5, 6]),
    ]
}

fn catalog() -> ItemCatalog {
    vec![
        (1, "Vada Pav".to_string()),
        (2, "Cutting Chai".to_string()),
        (3, "Pav Bhaji".to_string()),
        (4, "Misal Pav".to_string()),
        (5, "Kanda Bhaji".to_string()),
        (6, "Sabudana Khichdi".to_string()),
    ]
    .into_iter()
    .collect()
}

async fn create_test_server(source: Arc<InMemorySource>, train: bool) -> TestServer {
    let state = Arc::new(AppState::new(source, 3, LIMITS));
    if train {
        state.reload().await.unwrap();
    }
    TestServer::new(create_router(state)).unwrap()
}

async fn trained_server() -> TestServer {
    let source = Arc::new(InMemorySource::new(orders(), catalog()));
    create_test_server(source, true).await
}

#[tokio::test]
async fn test_health_check() {
    let server = trained_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = trained_server().await;

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("test-request-1"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "test-request-1");

    let response = server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_recommendations() {
    let server = trained_server().await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": 1, "num_recommendations": 3 }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["user_id"], 1);

    let items = body["recommended_items"].as_array().unwrap();
    assert!(items.len() <= 3);
    assert!(!items.is_empty());

    let mut previous = f64::INFINITY;
    for item in items {
        let item_id = item["item_id"].as_i64().unwrap();
        let score = item["score"].as_f64().unwrap();
        // user 1 already ordered items 1 and 2
        assert!(item_id != 1 && item_id != 2);
        assert!(score <= previous);
        assert_eq!(item["item_name"], catalog().name_of(item_id));
        previous = score;
    }
}

#[tokio::test]
async fn test_recommendations_default_count() {
    let server = trained_server().await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": 4 }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    // user 4 owns 2 of 6 items
    assert_eq!(body["recommended_items"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_recommendations_are_deterministic() {
    let server = trained_server().await;
    let request = json!({ "user_id": 3, "num_recommendations": 5 });

    let first: serde_json::Value = server
        .post("/api/v1/recommendations")
        .json(&request)
        .await
        .json();
    let second: serde_json::Value = server
        .post("/api/v1/recommendations")
        .json(&request)
        .await
        .json();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_user_not_found() {
    let server = trained_server().await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": 999999, "num_recommendations": 5 }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("999999"));
}

#[tokio::test]
async fn test_too_many_recommendations_rejected() {
    let server = trained_server().await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": 1, "num_recommendations": 11 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_untrained_service_unavailable() {
    let source = Arc::new(InMemorySource::new(orders(), catalog()));
    let server = create_test_server(source, false).await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": 1 }))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let status: serde_json::Value = server.get("/api/v1/status").await.json();
    assert_eq!(status["state"], "empty");
}

#[tokio::test]
async fn test_status_after_training() {
    let server = trained_server().await;

    let response = server.get("/api/v1/status").await;
    response.assert_status_ok();

    let status: serde_json::Value = response.json();
    assert_eq!(status["state"], "trained");
    assert_eq!(status["users"], 5);
    assert_eq!(status["items"], 6);
    assert_eq!(status["neighbors"], 3);
}

#[tokio::test]
async fn test_items() {
    let server = trained_server().await;

    let items: Vec<serde_json::Value> = server.get("/api/v1/items").await.json();
    assert_eq!(items.len(), 6);
    assert_eq!(items[0]["item_id"], 1);
    assert_eq!(items[0]["name"], "Vada Pav");

    let response = server.get("/api/v1/items/3").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "item_id": 3, "name": "Pav Bhaji" }));

    server
        .get("/api/v1/items/99")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reload_picks_up_new_orders() {
    let source = Arc::new(InMemorySource::new(orders(), catalog()));
    let server = create_test_server(Arc::clone(&source), true).await;

    server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": 7 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let mut more = orders();
    more.push(OrderRecord::new(7, vec![3, 6]));
    source.replace_orders(more);

    let response = server.post("/api/v1/reload").await;
    response.assert_status_ok();
    let status: serde_json::Value = response.json();
    assert_eq!(status["users"], 6);

    server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": 7 }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_failed_reload_keeps_serving() {
    let source = Arc::new(InMemorySource::new(orders(), catalog()));
    let server = create_test_server(Arc::clone(&source), true).await;

    source.replace_orders(vec![OrderRecord::new(1, vec![])]);

    server
        .post("/api/v1/reload")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": 1 }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_reload_picks_up_renamed_items() {
    let source = Arc::new(InMemorySource::new(orders(), catalog()));
    let server = create_test_server(Arc::clone(&source), true).await;

    let mut renamed = catalog();
    renamed.insert(3, "Butter Pav Bhaji");
    source.replace_catalog(renamed);

    server.post("/api/v1/reload").await.assert_status_ok();

    server
        .get("/api/v1/items/3")
        .await
        .assert_json(&json!({ "item_id": 3, "name": "Butter Pav Bhaji" }));
}

/// Source whose first catalog fetch blocks until released
struct GatedSource {
    inner: InMemorySource,
    gated: AtomicBool,
    entered: Notify,
    release: Notify,
}

#[async_trait::async_trait]
impl OrderDataSource for GatedSource {
    async fn fetch_orders(&self) -> AppResult<Vec<OrderRecord>> {
        self.inner.fetch_orders().await
    }

    async fn fetch_catalog(&self) -> AppResult<ItemCatalog> {
        if self.gated.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.fetch_catalog().await
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

#[tokio::test]
async fn test_overlapping_reloads_publish_in_order() {
    let source = Arc::new(GatedSource {
        inner: InMemorySource::new(orders()[..3].to_vec(), catalog()),
        gated: AtomicBool::new(true),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let state = Arc::new(AppState::new(source.clone(), 3, LIMITS));

    // first reload has read the two-user orders and is parked in the catalog fetch
    let first = tokio::spawn({
        let state = Arc::clone(&state);
        async move { state.reload().await }
    });
    source.entered.notified().await;

    source.inner.replace_orders(orders());
    let second = tokio::spawn({
        let state = Arc::clone(&state);
        async move { state.reload().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    source.release.notify_one();
    assert_eq!(first.await.unwrap().unwrap().users, 2);
    assert_eq!(second.await.unwrap().unwrap().users, 5);

    assert_eq!(state.recommender.status().users, 5);
}
