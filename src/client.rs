//! HTTP test clients.
//!
//! [`TestClient`] drives an axum [`Router`] in-process: every request is sent
//! through `tower::ServiceExt::oneshot` against a clone of the router, cookies
//! are carried across requests, and the result is collected into a
//! [`TestResponse`].
//!
//! [`JsonClient`] is an adapter over a [`TestClient`] that speaks the JSON
//! convention of asynchronous browser requests: payloads are serialized with
//! `serde_json`, the content type is forced to `application/json`, and every
//! request carries an `X-Requested-With: XMLHttpRequest` header. It is a
//! wrapping type with its own call surface, not a patched method on the inner
//! client.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum::routing::get;
//! use axum_fixture::client::TestClient;
//!
//! async fn example() {
//!     let app = Router::new().route("/hello", get(|| async { "Hello, World!" }));
//!     let mut client = TestClient::new(app);
//!
//!     let response = client.get("/hello").await;
//!     assert_eq!(response.status_code(), 200);
//!     assert_eq!(response.text(), "Hello, World!");
//! }
//! ```

use std::collections::HashMap;

use axum::Router;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Method, Request};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::response::TestResponse;

/// Session values attached to a test client.
///
/// A plain key/value store the test can prime before issuing requests (for
/// example to simulate a logged-in user) and inspect afterwards (for example
/// to assert on flash messages under the `_flashes` key).
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    values: HashMap<String, serde_json::Value>,
}

impl SessionData {
    /// Creates empty session data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Stores `value` under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    /// Returns `true` if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A test client for making simulated HTTP requests against an axum router.
///
/// Maintains cookies across requests and provides convenience methods for the
/// common HTTP verbs. Bodies supplied to [`post`](Self::post),
/// [`put`](Self::put), and [`patch`](Self::patch) are form-encoded; for JSON
/// requests use [`JsonClient`].
pub struct TestClient {
    app: Router,
    cookies: HashMap<String, String>,
    session: SessionData,
}

impl TestClient {
    /// Creates a new test client wrapping the given router.
    pub fn new(app: Router) -> Self {
        Self {
            app,
            cookies: HashMap::new(),
            session: SessionData::new(),
        }
    }

    /// Sends a GET request to the given path.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.open(Method::GET, path, None, &[]).await
    }

    /// Sends a POST request with form data.
    pub async fn post(&mut self, path: &str, data: &HashMap<String, String>) -> TestResponse {
        self.form_request(Method::POST, path, data).await
    }

    /// Sends a PUT request with form data.
    pub async fn put(&mut self, path: &str, data: &HashMap<String, String>) -> TestResponse {
        self.form_request(Method::PUT, path, data).await
    }

    /// Sends a PATCH request with form data.
    pub async fn patch(&mut self, path: &str, data: &HashMap<String, String>) -> TestResponse {
        self.form_request(Method::PATCH, path, data).await
    }

    /// Sends a DELETE request to the given path.
    pub async fn delete(&mut self, path: &str) -> TestResponse {
        self.open(Method::DELETE, path, None, &[]).await
    }

    /// Sends a HEAD request to the given path.
    pub async fn head(&mut self, path: &str) -> TestResponse {
        self.open(Method::HEAD, path, None, &[]).await
    }

    /// Sends an OPTIONS request to the given path.
    pub async fn options(&mut self, path: &str) -> TestResponse {
        self.open(Method::OPTIONS, path, None, &[]).await
    }

    /// Sets a cookie that will be included in subsequent requests.
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    /// Clears all cookies from the client.
    pub fn clear_cookies(&mut self) {
        self.cookies.clear();
    }

    /// Returns a reference to the session data.
    pub const fn session(&self) -> &SessionData {
        &self.session
    }

    /// Returns a mutable reference to the session data.
    pub fn session_mut(&mut self) -> &mut SessionData {
        &mut self.session
    }

    /// Sends a request assembled from raw parts.
    ///
    /// The cookie header is always added from the current jar; `headers` are
    /// applied on top. This is the seam adapters such as [`JsonClient`] build
    /// on.
    pub async fn open(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        headers: &[(HeaderName, HeaderValue)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some(cookie) = self.cookie_header() {
            builder = builder.header(http::header::COOKIE, cookie);
        }

        for (name, value) in headers {
            builder = builder.header(name.clone(), value.clone());
        }

        let req = builder
            .body(body.map_or_else(axum::body::Body::empty, axum::body::Body::from))
            .expect("request builder should not fail");

        self.send(req).await
    }

    async fn form_request(
        &mut self,
        method: Method,
        path: &str,
        data: &HashMap<String, String>,
    ) -> TestResponse {
        let body = Self::encode_form_data(data).into_bytes();
        let headers = [(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        )];
        self.open(method, path, Some(body), &headers).await
    }

    /// Encodes form data as a URL-encoded string.
    fn encode_form_data(data: &HashMap<String, String>) -> String {
        data.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Builds the Cookie header from the current cookie jar.
    fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Sends the request through the router and builds a `TestResponse`.
    async fn send(&mut self, req: Request<axum::body::Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(req)
            .await
            .expect("router should not error");

        let status = response.status();
        let headers = response.headers().clone();

        // Absorb Set-Cookie headers into the jar.
        let mut response_cookies = HashMap::new();
        for value in headers.get_all(http::header::SET_COOKIE) {
            if let Ok(cookie_str) = value.to_str() {
                if let Some(pair) = cookie_str.split(';').next() {
                    if let Some((name, val)) = pair.split_once('=') {
                        let name = name.trim().to_string();
                        let val = val.trim().to_string();
                        self.cookies.insert(name.clone(), val.clone());
                        response_cookies.insert(name, val);
                    }
                }
            }
        }

        let body_bytes = response
            .into_body()
            .collect()
            .await
            .map_or_else(|_| Bytes::new(), http_body_util::Collected::to_bytes);

        TestResponse::new(status, headers, body_bytes.to_vec(), response_cookies)
    }
}

/// A JSON-speaking adapter over a [`TestClient`].
///
/// Every request it issues has its payload serialized to JSON, the
/// `Content-Type` header forced to `application/json`, and the
/// `X-Requested-With: XMLHttpRequest` marker header attached, regardless of
/// HTTP verb. Cookie and session handling is inherited unchanged from the
/// wrapped client.
pub struct JsonClient {
    inner: TestClient,
}

impl JsonClient {
    /// Wraps the given client.
    pub fn new(inner: TestClient) -> Self {
        Self { inner }
    }

    /// Sends a GET request.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None).await
    }

    /// Sends a POST request with a JSON payload.
    pub async fn post(&mut self, path: &str, payload: &serde_json::Value) -> TestResponse {
        self.request(Method::POST, path, Some(payload)).await
    }

    /// Sends a PUT request with a JSON payload.
    pub async fn put(&mut self, path: &str, payload: &serde_json::Value) -> TestResponse {
        self.request(Method::PUT, path, Some(payload)).await
    }

    /// Sends a PATCH request with a JSON payload.
    pub async fn patch(&mut self, path: &str, payload: &serde_json::Value) -> TestResponse {
        self.request(Method::PATCH, path, Some(payload)).await
    }

    /// Sends a DELETE request.
    pub async fn delete(&mut self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, None).await
    }

    /// Sets a cookie on the wrapped client.
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.inner.set_cookie(name, value);
    }

    /// Returns the wrapped client's session data.
    pub const fn session(&self) -> &SessionData {
        self.inner.session()
    }

    /// Returns the wrapped client's session data mutably.
    pub fn session_mut(&mut self) -> &mut SessionData {
        self.inner.session_mut()
    }

    /// Returns a mutable reference to the wrapped client.
    pub fn inner_mut(&mut self) -> &mut TestClient {
        &mut self.inner
    }

    /// Unwraps into the inner client.
    pub fn into_inner(self) -> TestClient {
        self.inner
    }

    async fn request(
        &mut self,
        method: Method,
        path: &str,
        payload: Option<&serde_json::Value>,
    ) -> TestResponse {
        let body = payload.map(|p| {
            serde_json::to_vec(p).expect("JSON value serialization should not fail")
        });
        let headers = [
            (
                http::header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ),
            (
                HeaderName::from_static("x-requested-with"),
                HeaderValue::from_static("XMLHttpRequest"),
            ),
        ];
        self.inner.open(method, path, body, &headers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::{any, get, post};
    use http::StatusCode;
    use serde_json::json;

    fn test_app() -> Router {
        Router::new()
            .route("/hello", get(|| async { "Hello, World!" }))
            .route("/echo", post(|body: String| async move { body }))
            .route(
                "/describe",
                any(
                    |headers: http::HeaderMap, body: Bytes| async move {
                        let content_type = headers
                            .get("content-type")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("")
                            .to_string();
                        let xhr = headers
                            .get("x-requested-with")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("")
                            .to_string();
                        axum::Json(json!({
                            "content_type": content_type,
                            "xhr": xhr,
                            "body": String::from_utf8_lossy(&body),
                        }))
                    },
                ),
            )
            .route(
                "/cookie",
                get(|headers: http::HeaderMap| async move {
                    headers
                        .get("cookie")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("no cookies")
                        .to_string()
                }),
            )
            .route(
                "/set-cookie",
                get(|| async {
                    (
                        [(http::header::SET_COOKIE, "session=abc123; Path=/")],
                        "cookie set",
                    )
                }),
            )
            .route(
                "/status/201",
                get(|| async { (StatusCode::CREATED, "created") }),
            )
    }

    // ── TestClient ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_get_simple() {
        let mut client = TestClient::new(test_app());
        let response = client.get("/hello").await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.text(), "Hello, World!");
    }

    #[tokio::test]
    async fn test_post_form_data() {
        let mut client = TestClient::new(test_app());
        let mut data = HashMap::new();
        data.insert("name".to_string(), "test".to_string());

        let response = client.post("/echo", &data).await;
        assert_eq!(response.status_code(), 200);
        assert!(response.text().contains("name=test"));
    }

    #[tokio::test]
    async fn test_status_codes() {
        let mut client = TestClient::new(test_app());
        let response = client.get("/status/201").await;
        assert_eq!(response.status_code(), 201);

        let response = client.get("/nonexistent").await;
        assert_eq!(response.status_code(), 404);
    }

    #[tokio::test]
    async fn test_cookies_roundtrip() {
        let mut client = TestClient::new(test_app());
        let response = client.get("/set-cookie").await;
        assert_eq!(response.cookies.get("session"), Some(&"abc123".to_string()));

        let response = client.get("/cookie").await;
        assert!(response.text().contains("session=abc123"));

        client.clear_cookies();
        let response = client.get("/cookie").await;
        assert_eq!(response.text(), "no cookies");
    }

    #[tokio::test]
    async fn test_set_cookie_manually() {
        let mut client = TestClient::new(test_app());
        client.set_cookie("csrftoken", "abc123");

        let response = client.get("/cookie").await;
        assert!(response.text().contains("csrftoken=abc123"));
    }

    #[test]
    fn test_session_data() {
        let mut client = TestClient::new(Router::new());
        assert!(client.session().is_empty());

        client.session_mut().set("user_id", json!(7));
        assert_eq!(client.session().get("user_id"), Some(&json!(7)));

        assert_eq!(client.session_mut().remove("user_id"), Some(json!(7)));
        assert!(client.session().get("user_id").is_none());
    }

    // ── JsonClient ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_json_client_post_serializes_payload() {
        let mut client = JsonClient::new(TestClient::new(test_app()));
        let payload = json!({"name": "foo"});

        let response = client.post("/describe", &payload).await;
        let body = response.json().unwrap();

        assert_eq!(body["content_type"], "application/json");
        assert_eq!(body["xhr"], "XMLHttpRequest");
        assert_eq!(body["body"], serde_json::to_string(&payload).unwrap());
    }

    #[tokio::test]
    async fn test_json_client_marks_every_verb() {
        let mut client = JsonClient::new(TestClient::new(test_app()));
        let payload = json!({"name": "foo"});

        let responses = vec![
            client.get("/describe").await,
            client.post("/describe", &payload).await,
            client.put("/describe", &payload).await,
            client.patch("/describe", &payload).await,
            client.delete("/describe").await,
        ];

        for response in responses {
            let body = response.json().unwrap().clone();
            assert_eq!(body["content_type"], "application/json");
            assert_eq!(body["xhr"], "XMLHttpRequest");
        }
    }

    #[tokio::test]
    async fn test_json_client_inherits_cookies() {
        let mut client = JsonClient::new(TestClient::new(test_app()));
        client.set_cookie("token", "xyz");

        let response = client.inner_mut().get("/cookie").await;
        assert!(response.text().contains("token=xyz"));
    }
}
