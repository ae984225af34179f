//! Assertion helpers shared by all test cases.
//!
//! All helpers are read-only queries over already-captured state: the
//! response object, the captured render events, or the client session. None
//! of them mutate anything.
//!
//! Status helpers exist for the common codes: [`assert_ok`] (200),
//! [`assert_created`] (201), [`assert_no_content`] (204),
//! [`assert_bad_request`] (400), [`assert_unauthorized`] (401),
//! [`assert_forbidden`] (403), [`assert_not_found`] (404), and
//! [`assert_method_not_allowed`] (405).

use crate::client::SessionData;
use crate::error::{FixtureError, FixtureResult};
use crate::response::TestResponse;
use crate::signal::RenderEvent;

/// Asserts that the response status code matches the expected value.
///
/// # Panics
///
/// Panics if the status code does not match.
pub fn assert_status(response: &TestResponse, expected: u16) {
    assert_eq!(
        response.status_code(),
        expected,
        "Expected status {expected}, got {}",
        response.status_code()
    );
}

/// Asserts a 200 OK response.
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, 200);
}

/// Asserts a 201 Created response.
pub fn assert_created(response: &TestResponse) {
    assert_status(response, 201);
}

/// Asserts a 204 No Content response.
pub fn assert_no_content(response: &TestResponse) {
    assert_status(response, 204);
}

/// Asserts a 400 Bad Request response.
pub fn assert_bad_request(response: &TestResponse) {
    assert_status(response, 400);
}

/// Asserts a 401 Unauthorized response.
pub fn assert_unauthorized(response: &TestResponse) {
    assert_status(response, 401);
}

/// Asserts a 403 Forbidden response.
pub fn assert_forbidden(response: &TestResponse) {
    assert_status(response, 403);
}

/// Asserts a 404 Not Found response.
pub fn assert_not_found(response: &TestResponse) {
    assert_status(response, 404);
}

/// Asserts a 405 Method Not Allowed response.
pub fn assert_method_not_allowed(response: &TestResponse) {
    assert_status(response, 405);
}

/// Asserts that the response body contains the given text.
///
/// # Panics
///
/// Panics if the body does not contain `text`.
pub fn assert_contains(response: &TestResponse, text: &str) {
    let body = response.text();
    assert!(
        body.contains(text),
        "Response body does not contain '{text}'.\nActual body: {body}"
    );
}

/// Asserts that the response body does not contain the given text.
///
/// # Panics
///
/// Panics if the body contains `text`.
pub fn assert_not_contains(response: &TestResponse, text: &str) {
    let body = response.text();
    assert!(
        !body.contains(text),
        "Response body unexpectedly contains '{text}'.\nActual body: {body}"
    );
}

/// Asserts that the response is a redirect (3xx) to the expected location.
///
/// # Panics
///
/// Panics if the response is not a redirect or the `Location` header does
/// not match.
pub fn assert_redirects(response: &TestResponse, expected_location: &str) {
    let status = response.status_code();
    assert!(
        (300..400).contains(&status),
        "Expected a redirect (3xx), got {status}"
    );

    let location = response
        .header("location")
        .unwrap_or_else(|| panic!("Redirect response missing Location header"));

    assert_eq!(
        location, expected_location,
        "Expected redirect to '{expected_location}', got '{location}'"
    );
}

/// Asserts that the named template appears among the captured render events.
///
/// # Panics
///
/// Panics if no captured render used the template.
pub fn assert_template_used(events: &[RenderEvent], name: &str) {
    let used = events.iter().any(|event| event.template == name);
    assert!(used, "template {name} not used");
}

/// Returns a variable from the context of any captured render event.
///
/// Searches events in capture order and returns the first occurrence.
/// Returns [`FixtureError::ContextVariableNotFound`] — a distinct signal
/// from an assertion failure — if no render carried the variable.
pub fn get_context_variable(events: &[RenderEvent], name: &str) -> FixtureResult<serde_json::Value> {
    events
        .iter()
        .find_map(|event| event.context.get(name).cloned())
        .ok_or_else(|| FixtureError::ContextVariableNotFound(name.to_string()))
}

/// Asserts that a context variable was rendered with the given value.
///
/// # Panics
///
/// Panics if the variable is absent or differs from `expected`.
pub fn assert_context(events: &[RenderEvent], name: &str, expected: &serde_json::Value) {
    match get_context_variable(events, name) {
        Ok(actual) => assert_eq!(
            actual, *expected,
            "Context variable '{name}' is {actual}, expected {expected}"
        ),
        Err(_) => panic!("Context variable does not exist: {name}"),
    }
}

/// Asserts that exactly one flash message with the given category and text
/// was recorded in the session under the `_flashes` key.
///
/// # Panics
///
/// Panics if `_flashes` is missing, holds more than one message, or the
/// message does not match.
pub fn assert_flash_message(session: &SessionData, expected_category: &str, expected_message: &str) {
    let flashes = session
        .get("_flashes")
        .and_then(serde_json::Value::as_array)
        .unwrap_or_else(|| panic!("No flash messages in session"));

    assert_eq!(flashes.len(), 1, "Expected exactly one flash message");
    let category = flashes[0][0].as_str().unwrap_or_default();
    let message = flashes[0][1].as_str().unwrap_or_default();
    assert_eq!(category, expected_category);
    assert_eq!(message, expected_message);
}
