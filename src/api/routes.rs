use axum::{
    routing::get,
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::store::traits::VoteStore;

pub fn create_router<S: VoteStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/env-check", get(handlers::env_check::<S>))
        // Gallery catalog
        .route("/artworks", get(handlers::list_artworks::<S>))
        // Emotion counters
        .route(
            "/emotions/:painting_id",
            get(handlers::get_emotion_counts::<S>).post(handlers::adjust_emotion_count::<S>),
        )
        // Per-visitor submissions
        .route(
            "/emotions/:painting_id/submission",
            get(handlers::get_submission::<S>).post(handlers::put_submission::<S>),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::visitor_extractor::SESSION_HEADER;
    use crate::config::AppConfig;
    use crate::seed::gallery_catalog;
    use crate::store::memory::MemoryStore;
    use crate::store::traits::CountStore;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), gallery_catalog(), AppConfig::default());
        (create_router().with_state(state), store)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "198.51.100.4")
            .header(SESSION_HEADER, "session_1_abcdefghi")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", "198.51.100.4")
            .header(SESSION_HEADER, "session_1_abcdefghi")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_counts_roundtrip_through_api() {
        let (app, _) = app();

        let (status, body) = send(&app, post_json("/emotions/1", json!({"emotion": "Calm", "delta": 1}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "newCount": 1}));

        let response = app.clone().oneshot(get("/emotions/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CACHE_CONTROL]
            .to_str()
            .unwrap()
            .contains("no-store"));

        let (_, body) = send(&app, get("/emotions/1")).await;
        assert_eq!(body, json!({"counts": {"Calm": 1}}));
    }

    #[tokio::test]
    async fn test_decrement_clamps_at_zero() {
        let (app, store) = app();
        let (status, body) = send(&app, post_json("/emotions/2", json!({"emotion": "Solitary", "delta": -1}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["newCount"], 0);
        assert_eq!(store.get_counts(2).await.unwrap()["Solitary"], 0);
    }

    #[tokio::test]
    async fn test_rejects_bad_identifiers_before_store_access() {
        let (app, store) = app();

        let (status, body) = send(&app, get("/emotions/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid painting ID");

        let (status, _) = send(&app, get("/emotions/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, post_json("/emotions/1", json!({"delta": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");

        let (status, _) = send(&app, post_json("/emotions/1", json!({"emotion": "Warm", "delta": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, post_json("/emotions/1/submission", json!({"selectedEmotions": "Calm"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Failed to parse request body"));

        let (status, body) = send(&app, post_json("/emotions/1/submission", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "selectedEmotions must be an array");

        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_submission_is_scoped_to_visitor_session() {
        let (app, _) = app();

        let (status, body) = send(&app, get("/emotions/3/submission")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"hasSubmitted": false, "previousEmotions": []}));

        let (status, body) = send(
            &app,
            post_json("/emotions/3/submission", json!({"selectedEmotions": ["Warm", "Hopeful"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (_, body) = send(&app, get("/emotions/3/submission")).await;
        assert_eq!(body, json!({"hasSubmitted": true, "previousEmotions": ["Hopeful", "Warm"]}));

        let other_tab = Request::builder()
            .uri("/emotions/3/submission")
            .header("x-forwarded-for", "198.51.100.4")
            .header(SESSION_HEADER, "session_2_zzzzzzzzz")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&app, other_tab).await;
        assert_eq!(body["hasSubmitted"], false);
    }

    #[tokio::test]
    async fn test_catalog_and_health() {
        let (app, _) = app();

        let (status, body) = send(&app, get("/artworks")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 16);
        assert_eq!(body[0]["id"], 1);

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (_, body) = send(&app, get("/env-check")).await;
        assert_eq!(body["storeBackend"], "memory");
        assert_eq!(body["catalogSize"], 16);
    }
}
