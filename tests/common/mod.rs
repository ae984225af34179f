//! A small tag API used by the integration tests: an in-memory CRUD store
//! following the HTTP+JSON convention (201 + `data` on create, 200 + `data`
//! on read, 204 on delete, 404 for unknown ids), plus a page that announces
//! its template render on the application's signal.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use axum_fixture::{AppFactory, FixtureResult, RenderEvent, Signal, TemplateSignal, TestApp};

#[derive(Clone, Default)]
struct TagStore {
    tags: Arc<Mutex<HashMap<i64, Value>>>,
    next_id: Arc<AtomicI64>,
}

async fn list_tags(State(store): State<TagStore>) -> Json<Value> {
    let tags: Vec<Value> = store.tags.lock().unwrap().values().cloned().collect();
    Json(json!({ "data": tags }))
}

async fn create_tag(State(store): State<TagStore>, Json(payload): Json<Value>) -> Response {
    let id = store.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let mut tag = payload.as_object().cloned().unwrap_or_default();
    tag.insert("id".to_string(), json!(id));
    let tag = Value::Object(tag);
    store.tags.lock().unwrap().insert(id, tag.clone());
    (StatusCode::CREATED, Json(json!({ "data": tag }))).into_response()
}

async fn show_tag(State(store): State<TagStore>, Path(id): Path<i64>) -> Response {
    let tag = store.tags.lock().unwrap().get(&id).cloned();
    match tag {
        Some(tag) => Json(json!({ "data": tag })).into_response(),
        None => not_found(),
    }
}

async fn update_tag(
    State(store): State<TagStore>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> Response {
    let mut tags = store.tags.lock().unwrap();
    if !tags.contains_key(&id) {
        return not_found();
    }
    let mut tag = payload.as_object().cloned().unwrap_or_default();
    tag.insert("id".to_string(), json!(id));
    let tag = Value::Object(tag);
    tags.insert(id, tag.clone());
    Json(json!({ "data": tag })).into_response()
}

async fn delete_tag(State(store): State<TagStore>, Path(id): Path<i64>) -> Response {
    if store.tags.lock().unwrap().remove(&id).is_none() {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "tag not found" }))).into_response()
}

/// Builds the tag application: CRUD routes plus a rendered page.
pub fn tag_app() -> TestApp {
    let signal: TemplateSignal = Arc::new(Signal::new());
    let render = signal.clone();
    let hello = move || {
        let render = render.clone();
        async move {
            render.send(&RenderEvent::new(
                "hello.html",
                json!({ "x": 1, "greeting": "hello" }),
            ));
            Html("<h1>hello</h1>")
        }
    };

    let router = Router::new()
        .route("/hello", get(hello))
        .route("/tags", get(list_tags).post(create_tag))
        .route(
            "/tags/{id}",
            get(show_tag).put(update_tag).delete(delete_tag),
        )
        .with_state(TagStore::default());

    TestApp::new(router).with_template_signal(signal)
}

/// The factory the integration tests hand to their harnesses.
pub struct TagAppFactory;

impl AppFactory for TagAppFactory {
    fn create_app(&self) -> FixtureResult<TestApp> {
        Ok(tag_app())
    }
}
