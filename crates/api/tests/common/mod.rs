#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use rally_api::config::ServerConfig;
use rally_api::router::build_app_router;
use rally_api::state::AppState;
use rally_test_utils::MemoryStore;

/// Host header the seeded test campaign is served on.
pub const CAMPAIGN_HOST: &str = "api:5000";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Build the full application router over an in-memory store.
///
/// Uses the same builder as `main.rs`, so tests exercise the production
/// middleware stack.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    let config = test_config();
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Issue a GET with the given `Host` header.
pub async fn get_with_host(app: Router, uri: &str, host: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("host", host)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a GET on the seeded campaign's host.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    get_with_host(app, uri, CAMPAIGN_HOST).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
