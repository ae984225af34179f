//! Canned test bodies for CRUD-style JSON resources.
//!
//! [`ResourceSuite`] bundles the create/index/show/update/delete test bodies
//! shared by every resource that follows the HTTP+JSON convention:
//!
//! - creation returns 201 with a JSON body carrying a `data` field,
//! - retrieval, listing, and update return 200 with `data` (a list when
//!   listing),
//! - deletion returns 204 with an empty body,
//! - operating on an unknown identifier returns 404.
//!
//! The suite is plain composition: it borrows a [`JsonClient`] and is
//! parameterized by the collection URL, the identifier field, and the
//! creation payload. The `data` of the most recent creation is kept in
//! [`current`](ResourceSuite::current) so dependent requests can chain off
//! it.
//!
//! Like the assertion helpers, the bodies panic on failure so the test
//! runner reports them as ordinary test failures.

use serde_json::{json, Value};

use crate::assertions::{assert_created, assert_no_content, assert_not_found, assert_ok};
use crate::client::JsonClient;

/// An identifier no real resource is expected to have.
const UNKNOWN_ID: i64 = 123_123;

/// Reusable CRUD test bodies for one resource.
pub struct ResourceSuite<'a> {
    client: &'a mut JsonClient,
    collection_url: String,
    id_field: String,
    creation_payload: Value,
    /// The `data` of the most recently created resource.
    pub current: Option<Value>,
}

impl<'a> ResourceSuite<'a> {
    /// Creates a suite for the resource at `collection_url` (e.g. `"/tags"`).
    ///
    /// The identifier field defaults to `"id"` and the creation payload to an
    /// empty object.
    pub fn new(client: &'a mut JsonClient, collection_url: impl Into<String>) -> Self {
        Self {
            client,
            collection_url: collection_url.into(),
            id_field: "id".to_string(),
            creation_payload: json!({}),
            current: None,
        }
    }

    /// Overrides the field the created resource's identifier is read from.
    #[must_use]
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Sets the payload sent by creation and update requests.
    #[must_use]
    pub fn with_creation_payload(mut self, payload: Value) -> Self {
        self.creation_payload = payload;
        self
    }

    /// Issues a creation request; asserts 201 and a `data` field.
    ///
    /// Records and returns the created resource's `data`.
    pub async fn create(&mut self) -> Value {
        let payload = self.creation_payload.clone();
        let response = self.client.post(&self.collection_url, &payload).await;
        assert_created(&response);

        let body = response
            .json()
            .expect("creation response body is not valid JSON");
        let data = body
            .get("data")
            .unwrap_or_else(|| panic!("creation response has no data field: {body}"))
            .clone();
        self.current = Some(data.clone());
        data
    }

    /// Creates a resource, then asserts the listing returns a non-empty
    /// `data` array.
    pub async fn index(&mut self) {
        self.create().await;

        let response = self.client.get(&self.collection_url).await;
        assert_ok(&response);
        let body = response
            .json()
            .expect("listing response body is not valid JSON");
        let items = body
            .get("data")
            .and_then(Value::as_array)
            .unwrap_or_else(|| panic!("listing response has no data list: {body}"));
        assert!(!items.is_empty(), "listing returned an empty data list");
    }

    /// Creates a resource, retrieves it, and asserts the unknown-identifier
    /// case returns 404.
    pub async fn show(&mut self) {
        let created = self.create().await;
        let url = self.member_url(&created);

        let response = self.client.get(&url).await;
        assert_ok(&response);
        let body = response
            .json()
            .expect("show response body is not valid JSON");
        let data = body
            .get("data")
            .unwrap_or_else(|| panic!("show response has no data field: {body}"));
        assert_eq!(
            data.get(&self.id_field),
            created.get(&self.id_field),
            "retrieved resource identifier differs from the created one"
        );

        let response = self.client.get(&self.unknown_url()).await;
        assert_not_found(&response);
    }

    /// Creates a resource, updates it, and asserts the unknown-identifier
    /// case returns 404.
    pub async fn update(&mut self) {
        let created = self.create().await;
        let url = self.member_url(&created);
        let payload = self.creation_payload.clone();

        let response = self.client.put(&url, &payload).await;
        assert_ok(&response);

        let response = self.client.put(&self.unknown_url(), &payload).await;
        assert_not_found(&response);
    }

    /// Creates a resource, deletes it, and asserts the unknown-identifier
    /// case returns 404.
    pub async fn delete(&mut self) {
        let created = self.create().await;
        let url = self.member_url(&created);

        let response = self.client.delete(&url).await;
        assert_no_content(&response);
        assert!(
            response.body.is_empty(),
            "deletion response has a non-empty body"
        );

        let response = self.client.delete(&self.unknown_url()).await;
        assert_not_found(&response);
    }

    /// The URL of one member, derived from its identifier field.
    ///
    /// # Panics
    ///
    /// Panics if the created resource lacks the identifier field.
    pub fn member_url(&self, data: &Value) -> String {
        let id = data
            .get(&self.id_field)
            .unwrap_or_else(|| panic!("resource has no '{}' field: {data}", self.id_field));
        format!("{}/{}", self.collection_url, id_segment(id))
    }

    fn unknown_url(&self) -> String {
        format!("{}/{UNKNOWN_ID}", self.collection_url)
    }
}

/// Renders an identifier value as a URL path segment.
fn id_segment(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
