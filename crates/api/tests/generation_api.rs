//! `POST /api/v1/generate` and `GET /api/v1/operations/{id}`.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;
use tourforge_core::request::MODEL_DRAFT;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn generate_returns_accepted_with_operation_id() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/marble/v1/worlds/generate"))
        .and(header("WLT-Api-Key", "test-key"))
        .and(body_partial_json(json!({
            "display_name": "12 Elm St",
            "model": MODEL_DRAFT,
            "world_prompt": {"type": "image", "image_prompt": {"source": "media_asset", "media_asset_id": "m_1"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"operation_id": "op_1"})))
        .expect(1)
        .mount(&vendor)
        .await;

    let response = post_json(
        common::build_test_app(&vendor),
        "/api/v1/generate",
        json!({
            "prompt": {"type": "image", "content": {"source": "media", "media_id": "m_1"}},
            "display_name": "12 Elm St",
            "model_tier": "draft"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(response).await["data"]["operation_id"], "op_1");
}

#[tokio::test]
async fn invalid_request_is_rejected_without_vendor_call() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&vendor)
        .await;

    let response = post_json(
        common::build_test_app(&vendor),
        "/api/v1/generate",
        json!({
            "prompt": {"type": "text", "text": "   "},
            "display_name": "Empty"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn vendor_rejection_is_bad_gateway_with_vendor_body() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/marble/v1/worlds/generate"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&vendor)
        .await;

    let response = post_json(
        common::build_test_app(&vendor),
        "/api/v1/generate",
        json!({
            "prompt": {"type": "text", "text": "Open-plan kitchen"},
            "display_name": "Kitchen"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VENDOR_ERROR");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("401"));
    assert!(message.contains("invalid api key"));
}

#[tokio::test]
async fn operation_status_reports_progress() {
    let vendor = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marble/v1/operations/op_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"done": false, "metadata": {"progress_pct": 42}})),
        )
        .mount(&vendor)
        .await;

    let response = get(common::build_test_app(&vendor), "/api/v1/operations/op_1").await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = &body_json(response).await["data"];
    assert_eq!(data["operation_id"], "op_1");
    assert_eq!(data["done"], false);
    assert_eq!(data["progress_percent"], 42);
    assert!(data["error"].is_null());
}

#[tokio::test]
async fn unknown_operation_is_bad_gateway() {
    let vendor = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marble/v1/operations/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&vendor)
        .await;

    let response = get(common::build_test_app(&vendor), "/api/v1/operations/missing").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn encoded_slashes_stay_inside_the_operation_id() {
    let vendor = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marble/v1/worlds/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .expect(0)
        .mount(&vendor)
        .await;

    let response = get(
        common::build_test_app(&vendor),
        "/api/v1/operations/..%2Fworlds%2Fsecret",
    )
    .await;

    assert_ne!(response.status(), StatusCode::OK);
    let requests = vendor.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| r.url.path().starts_with("/marble/v1/operations/")));
}

#[tokio::test]
async fn dot_dot_operation_id_is_bad_request() {
    let vendor = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .expect(0)
        .mount(&vendor)
        .await;

    let response = get(common::build_test_app(&vendor), "/api/v1/operations/%2E%2E").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
