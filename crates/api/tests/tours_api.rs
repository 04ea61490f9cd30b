//! `/api/v1/tours`, `/api/v1/worlds/{id}` and `/api/v1/media`.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, post_multipart, VIEWER_BASE};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_operation(vendor: &MockServer, id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/marble/v1/operations/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(vendor)
        .await;
}

#[tokio::test]
async fn running_operation_is_a_conflict() {
    let vendor = MockServer::start().await;
    mount_operation(&vendor, "op_run", json!({"done": false})).await;

    let response = post_json(
        common::build_test_app(&vendor),
        "/api/v1/tours",
        json!({"operation_id": "op_run", "display_name": "Den"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn finished_operation_is_added_to_the_session() {
    let vendor = MockServer::start().await;
    mount_operation(&vendor, "op_a", json!({"done": true, "response": {"world_id": "abc123"}})).await;
    mount_operation(&vendor, "op_b", json!({"done": true, "response": {"id": "def456"}})).await;
    Mock::given(method("GET"))
        .and(path("/marble/v1/worlds/abc123"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&vendor)
        .await;
    Mock::given(method("GET"))
        .and(path("/marble/v1/worlds/def456"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"world_marble_url": "https://marble.worldlabs.ai/worlds/def456?s=1"})),
        )
        .mount(&vendor)
        .await;

    let app = common::build_test_app(&vendor);

    let first = post_json(
        app.clone(),
        "/api/v1/tours",
        json!({"operation_id": "op_a", "display_name": "Front Porch"}),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let tour = &body_json(first).await["data"];
    assert_eq!(tour["world_id"], "abc123");
    assert_eq!(tour["view_url"], format!("{VIEWER_BASE}/worlds/abc123"));
    assert_eq!(tour["display_name"], "Front Porch");

    let second = post_json(
        app.clone(),
        "/api/v1/tours",
        json!({"operation_id": "op_b", "display_name": "Backyard"}),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CREATED);

    let list = body_json(get(app, "/api/v1/tours").await).await;
    let tours = list["data"].as_array().unwrap();
    assert_eq!(tours.len(), 2);
    assert_eq!(tours[0]["world_id"], "abc123");
    assert_eq!(tours[1]["view_url"], "https://marble.worldlabs.ai/worlds/def456?s=1");
}

#[tokio::test]
async fn failed_operation_is_not_added() {
    let vendor = MockServer::start().await;
    mount_operation(
        &vendor,
        "op_bad",
        json!({"done": true, "error": {"message": "could not reconstruct scene"}}),
    )
    .await;

    let app = common::build_test_app(&vendor);
    let response = post_json(
        app.clone(),
        "/api/v1/tours",
        json!({"operation_id": "op_bad", "display_name": "Attic"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "GENERATION_FAILED");
    assert!(json["error"].as_str().unwrap().contains("could not reconstruct scene"));

    let list = body_json(get(app, "/api/v1/tours").await).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn blank_display_name_is_rejected() {
    let vendor = MockServer::start().await;
    let response = post_json(
        common::build_test_app(&vendor),
        "/api/v1/tours",
        json!({"operation_id": "op_a", "display_name": ""}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn world_view_falls_back_to_template() {
    let vendor = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marble/v1/worlds/w_9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "no url here"})))
        .mount(&vendor)
        .await;

    let response = get(common::build_test_app(&vendor), "/api/v1/worlds/w_9").await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = &body_json(response).await["data"];
    assert_eq!(data["world_id"], "w_9");
    assert_eq!(data["view_url"], format!("{VIEWER_BASE}/worlds/w_9"));
}

#[tokio::test]
async fn media_upload_returns_created_reference() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/marble/v1/media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"media_id": "m_77"})))
        .expect(1)
        .mount(&vendor)
        .await;

    let response = post_multipart(
        common::build_test_app(&vendor),
        "/api/v1/media",
        "file",
        "kitchen.jpg",
        "image/jpeg",
        &[0xFF, 0xD8, 0xFF, 0xE0],
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["media_id"], "m_77");
}

#[tokio::test]
async fn media_upload_without_file_field_is_bad_request() {
    let vendor = MockServer::start().await;
    let response = post_multipart(
        common::build_test_app(&vendor),
        "/api/v1/media",
        "attachment",
        "kitchen.jpg",
        "image/jpeg",
        &[1, 2, 3],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejected_upload_is_bad_gateway() {
    let vendor = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/marble/v1/media"))
        .respond_with(ResponseTemplate::new(413).set_body_string("too large"))
        .mount(&vendor)
        .await;

    let response = post_multipart(
        common::build_test_app(&vendor),
        "/api/v1/media",
        "file",
        "garage.png",
        "image/png",
        &[0x89, 0x50],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let message = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(message.contains("garage.png"));
    assert!(message.contains("413"));
}
