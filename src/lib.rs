//! # axum-fixture
//!
//! Test fixtures for axum applications: a request client that drives a
//! [`Router`](axum::Router) in-process, a response wrapper with cached JSON
//! access, an ordered setup/teardown fixture chain (application, database,
//! view), a harness with method- or class-level granularity and hook points,
//! shared assertion helpers, and canned CRUD resource test suites.
//!
//! ## Overview
//!
//! A test supplies an [`AppFactory`] that builds a [`TestApp`] — the router
//! plus an optional SQLite [`TestDatabase`] and a `template_rendered`
//! [`Signal`]. A [`Harness`] runs the [`FixtureChain`] over it: the
//! application fixture stores the app handle, the database fixture creates
//! the schema, and the view fixture opens a [`TestClient`] and a
//! [`JsonClient`] and starts capturing [`RenderEvent`]s. Teardown reverses
//! the chain exactly, releasing every handle so nothing leaks into the next
//! test.
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum::routing::get;
//! use axum_fixture::{AppFactory, FixtureResult, Harness, TestApp};
//!
//! struct MyApp;
//!
//! impl AppFactory for MyApp {
//!     fn create_app(&self) -> FixtureResult<TestApp> {
//!         Ok(TestApp::new(
//!             Router::new().route("/", get(|| async { "home" })),
//!         ))
//!     }
//! }
//!
//! async fn example() {
//!     let mut harness = Harness::new(MyApp);
//!     harness.setup_method().unwrap();
//!     let response = harness.ctx_mut().client().get("/").await;
//!     assert_eq!(response.status_code(), 200);
//!     harness.teardown_method().unwrap();
//! }
//! ```

pub mod app;
pub mod assertions;
pub mod client;
pub mod db;
pub mod error;
pub mod fixture;
pub mod harness;
pub mod logging;
pub mod resource;
pub mod response;
pub mod signal;

pub use app::TestApp;
pub use client::{JsonClient, SessionData, TestClient};
pub use db::TestDatabase;
pub use error::{FixtureError, FixtureResult};
pub use fixture::{AppFixture, DatabaseFixture, Fixture, FixtureChain, TestContext, ViewFixture};
pub use harness::{AppFactory, ClassHarness, Harness, SetupLevel};
pub use resource::ResourceSuite;
pub use response::TestResponse;
pub use signal::{RenderEvent, Signal, SignalReceiver, TemplateSignal};
