// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /availability
// - GET /input_schema
// - POST /analyze (completed + failed envelopes, unreadable bodies)

use std::sync::Arc;

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use feed_analyst::api::{self, AppState};
use feed_analyst::dispatcher::AnalysisDispatcher;
use feed_analyst::recommend::{ModelBackend, RecommendationScorer};

const BODY_LIMIT: usize = 1024 * 1024;

/// Router with a private heuristic backend, so tests never touch process config.
fn test_router() -> Router {
    let scorer = RecommendationScorer::new(Arc::new(ModelBackend::mock()));
    api::router(AppState::new(AnalysisDispatcher::new(scorer)))
}

async fn read_json(resp: shuttle_axum::axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

async fn post_analyze(payload: Json) -> (StatusCode, Json) {
    post_analyze_raw(payload.to_string()).await
}

async fn post_analyze_raw(raw: String) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(raw))
        .expect("build POST /analyze");
    let resp = test_router().oneshot(req).await.expect("oneshot /analyze");
    let status = resp.status();
    (status, read_json(resp).await)
}

#[tokio::test]
async fn health_returns_ok() {
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");
    let resp = test_router().oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.expect("read body");
    assert_eq!(String::from_utf8(bytes.to_vec()).expect("utf8"), "ok");
}

#[tokio::test]
async fn availability_reports_heuristic_backend() {
    let req = Request::builder()
        .uri("/availability")
        .body(Body::empty())
        .expect("build GET /availability");
    let resp = test_router().oneshot(req).await.expect("oneshot /availability");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["status"], "available");
    assert_eq!(v["model_ready"], false);
    assert_eq!(v["backend"], "mock");
}

#[tokio::test]
async fn input_schema_lists_fields() {
    let req = Request::builder()
        .uri("/input_schema")
        .body(Body::empty())
        .expect("build GET /input_schema");
    let resp = test_router().oneshot(req).await.expect("oneshot /input_schema");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    let ids: Vec<&str> = v["input_data"]
        .as_array()
        .expect("input_data array")
        .iter()
        .filter_map(|f| f["id"].as_str())
        .collect();
    for id in ["analysis_type", "text", "user_history", "candidates", "max_keywords", "summary_sentences", "top_k"] {
        assert!(ids.contains(&id), "missing {id} in {ids:?}");
    }
}

#[tokio::test]
async fn analyze_completes_with_metadata() {
    let (status, v) = post_analyze(json!({
        "identifier_from_purchaser": "aabbccddeeff00112233445566",
        "input_data": {
            "analysis_type": "[0]",
            "text": "This product is absolutely amazing! I love it. Best purchase ever."
        }
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "completed");
    assert_eq!(v["result"]["sentiment"], "positive");
    assert_eq!(v["metadata"]["analysis_type"], "sentiment");
    assert_eq!(v["metadata"]["purchaser"], "aabbccddeeff00112233445566");
    assert!(v["metadata"]["processing_time_seconds"].as_f64().is_some());
}

#[tokio::test]
async fn analyze_failure_is_200_with_failed_status() {
    let (status, v) = post_analyze(json!({
        "identifier_from_purchaser": "buyer",
        "input_data": { "analysis_type": "keywords", "text": "" }
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "failed");
    assert_eq!(v["purchaser"], "buyer");
    assert!(v["error"].as_str().unwrap_or_default().contains("'text'"));
}

#[tokio::test]
async fn analyze_ranking_over_http() {
    let (_, v) = post_analyze(json!({
        "input_data": {
            "analysis_type": 4,
            "user_history": "[{\"post_id\":\"p\",\"action\":\"like\",\"timestamp\":1}]",
            "candidates": "[{\"post_id\":\"c1\",\"text\":\"short\"},{\"post_id\":\"c2\",\"text\":\"important tech news\"}]",
            "top_k": 1
        }
    }))
    .await;

    assert_eq!(v["status"], "completed");
    let recs = v["result"]["recommendations"].as_array().expect("recommendations");
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["post_id"], "c2");
    assert_eq!(recs[0]["rank"], 1);
    assert_eq!(v["result"]["model_info"]["using_mock"], true);
}

#[tokio::test]
async fn malformed_body_still_gets_failed_envelope() {
    let (status, v) = post_analyze_raw("{not json".to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "failed");
    assert!(v["error"].as_str().unwrap_or_default().starts_with("Invalid request body"));
    assert!(v.get("purchaser").map_or(true, Json::is_null));
}

#[tokio::test]
async fn non_string_purchaser_is_passed_through_as_text() {
    let (status, v) = post_analyze(json!({
        "identifier_from_purchaser": 42,
        "input_data": { "text": "hello world here" }
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "completed");
    assert_eq!(v["metadata"]["purchaser"], "42");
    assert_eq!(v["metadata"]["analysis_type"], "general");
}
