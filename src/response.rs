//! The response type returned by the test clients.
//!
//! [`TestResponse`] exposes the status code, headers, cookies, and body of a
//! simulated request. The body can be read as text or as JSON; the JSON form
//! is parsed once on first access and cached, so repeated access returns the
//! identical parsed value.

use std::collections::HashMap;

use http::{HeaderMap, StatusCode};
use once_cell::sync::OnceCell;

use crate::error::{FixtureError, FixtureResult};

/// The response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body as raw bytes.
    pub body: Vec<u8>,
    /// Cookies set by the response.
    pub cookies: HashMap<String, String>,
    json: OnceCell<serde_json::Value>,
}

impl TestResponse {
    /// Creates a response from its parts.
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
        cookies: HashMap<String, String>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            cookies,
            json: OnceCell::new(),
        }
    }

    /// Returns the response body as a UTF-8 string.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Returns the response body parsed as JSON.
    ///
    /// The body is parsed on the first call; subsequent calls return a
    /// reference to the same cached value. A malformed body surfaces the
    /// underlying parser error on every call.
    pub fn json(&self) -> FixtureResult<&serde_json::Value> {
        self.json
            .get_or_try_init(|| serde_json::from_slice(&self.body).map_err(FixtureError::from))
    }

    /// Deserializes the response body into a concrete type.
    ///
    /// Bypasses the cache since the target type varies per call site.
    pub fn json_as<T: serde::de::DeserializeOwned>(&self) -> FixtureResult<T> {
        serde_json::from_slice(&self.body).map_err(FixtureError::from)
    }

    /// Returns the numeric status code.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns the value of a header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns `true` if the response has the given header.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Returns `true` if the response body contains the given text.
    pub fn contains(&self, text: &str) -> bool {
        self.text().contains(text)
    }
}
