//! End-to-end tests of the CRUD resource suite against the tag API.

mod common;

use axum_fixture::assertions::{assert_created, assert_no_content, assert_not_found, assert_ok};
use axum_fixture::{Harness, ResourceSuite};
use serde_json::json;

fn harness() -> Harness<common::TagAppFactory> {
    axum_fixture::logging::init();
    let mut harness = Harness::new(common::TagAppFactory);
    harness.setup_method().unwrap();
    harness
}

#[tokio::test]
async fn test_create_returns_data() {
    let mut harness = harness();

    let mut suite = ResourceSuite::new(harness.ctx_mut().json_client(), "/tags")
        .with_creation_payload(json!({"name": "foo"}));
    let data = suite.create().await;

    assert_eq!(data["name"], "foo");
    assert!(data["id"].is_i64());
    assert_eq!(suite.current.as_ref(), Some(&data));

    harness.teardown_method().unwrap();
}

#[tokio::test]
async fn test_index_lists_created_resources() {
    let mut harness = harness();

    ResourceSuite::new(harness.ctx_mut().json_client(), "/tags")
        .with_creation_payload(json!({"name": "foo"}))
        .index()
        .await;

    harness.teardown_method().unwrap();
}

#[tokio::test]
async fn test_show_and_unknown_id() {
    let mut harness = harness();

    ResourceSuite::new(harness.ctx_mut().json_client(), "/tags")
        .with_creation_payload(json!({"name": "foo"}))
        .show()
        .await;

    harness.teardown_method().unwrap();
}

#[tokio::test]
async fn test_update_and_unknown_id() {
    let mut harness = harness();

    ResourceSuite::new(harness.ctx_mut().json_client(), "/tags")
        .with_creation_payload(json!({"name": "foo"}))
        .update()
        .await;

    harness.teardown_method().unwrap();
}

#[tokio::test]
async fn test_delete_and_unknown_id() {
    let mut harness = harness();

    ResourceSuite::new(harness.ctx_mut().json_client(), "/tags")
        .with_creation_payload(json!({"name": "foo"}))
        .delete()
        .await;

    harness.teardown_method().unwrap();
}

/// The full lifecycle: POST gives 201 with `data.id`; GET with that id gives
/// 200 and matching data; DELETE gives 204; a further GET gives 404.
#[tokio::test]
async fn test_create_show_delete_lifecycle() {
    let mut harness = harness();
    let client = harness.ctx_mut().json_client();

    let response = client.post("/tags", &json!({"name": "foo"})).await;
    assert_created(&response);
    let created = response.json().unwrap()["data"].clone();
    let id = created["id"].clone();
    assert!(id.is_i64());
    let url = format!("/tags/{id}");

    let response = client.get(&url).await;
    assert_ok(&response);
    assert_eq!(response.json().unwrap()["data"], created);

    let response = client.delete(&url).await;
    assert_no_content(&response);
    assert!(response.body.is_empty());

    let response = client.get(&url).await;
    assert_not_found(&response);

    harness.teardown_method().unwrap();
}

#[tokio::test]
async fn test_update_unknown_id_returns_404() {
    let mut harness = harness();

    let response = harness
        .ctx_mut()
        .json_client()
        .put("/tags/123123", &json!({"name": "ghost"}))
        .await;
    assert_not_found(&response);

    harness.teardown_method().unwrap();
}
