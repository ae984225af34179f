//! The test harness that drives the fixture chain.
//!
//! A [`Harness`] owns an [`AppFactory`], a [`FixtureChain`], and the
//! [`TestContext`] the chain populates. It runs the chain at one of two
//! granularities selected by [`SetupLevel`]: per test method (the default) or
//! once per "class" of tests. The hooks on [`AppFactory`] are invoked at
//! fixed points around the chain so tests can inject extra fixture logic
//! without reordering the chain itself.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum::routing::get;
//! use axum_fixture::app::TestApp;
//! use axum_fixture::error::FixtureResult;
//! use axum_fixture::harness::{AppFactory, Harness};
//!
//! struct MyApp;
//!
//! impl AppFactory for MyApp {
//!     fn create_app(&self) -> FixtureResult<TestApp> {
//!         let router = Router::new().route("/", get(|| async { "home" }));
//!         Ok(TestApp::new(router))
//!     }
//! }
//!
//! async fn example() {
//!     let mut harness = Harness::new(MyApp);
//!     harness.setup_method().unwrap();
//!
//!     let response = harness.ctx_mut().client().get("/").await;
//!     assert_eq!(response.status_code(), 200);
//!
//!     harness.teardown_method().unwrap();
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::app::TestApp;
use crate::error::FixtureResult;
use crate::fixture::{FixtureChain, TestContext};

/// The granularity at which the fixture chain runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetupLevel {
    /// The chain runs before and after every individual test method.
    #[default]
    Method,
    /// The chain runs once for a whole group of tests sharing a harness.
    Class,
}

/// Builds the application under test and observes the fixture lifecycle.
///
/// `create_app` is the one required operation; the hooks default to no-ops.
pub trait AppFactory {
    /// Creates a fresh application instance ready for request dispatch.
    fn create_app(&self) -> FixtureResult<TestApp>;

    /// Invoked on the freshly created application before the chain runs.
    fn after_create_app(&self, _app: &mut TestApp) {}

    /// Invoked immediately before the fixture chain's setup.
    fn before_setup(&self) {}

    /// Invoked immediately after the fixture chain's setup.
    fn after_setup(&self, _ctx: &mut TestContext) {}

    /// Invoked immediately before the fixture chain's teardown.
    fn before_teardown(&self, _ctx: &mut TestContext) {}

    /// Invoked immediately after the fixture chain's teardown.
    fn after_teardown(&self) {}
}

/// Orchestrates fixture setup and teardown around an application factory.
pub struct Harness<F: AppFactory> {
    factory: F,
    level: SetupLevel,
    chain: FixtureChain,
    ctx: TestContext,
}

impl<F: AppFactory> Harness<F> {
    /// Creates a method-scoped harness with the standard fixture chain.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            level: SetupLevel::default(),
            chain: FixtureChain::default(),
            ctx: TestContext::new(),
        }
    }

    /// Selects the setup granularity.
    #[must_use]
    pub fn with_level(mut self, level: SetupLevel) -> Self {
        self.level = level;
        self
    }

    /// Replaces the fixture chain.
    #[must_use]
    pub fn with_chain(mut self, chain: FixtureChain) -> Self {
        self.chain = chain;
        self
    }

    /// Returns the configured setup level.
    pub const fn level(&self) -> SetupLevel {
        self.level
    }

    /// Returns the context populated by the chain.
    pub const fn ctx(&self) -> &TestContext {
        &self.ctx
    }

    /// Returns the context mutably.
    pub fn ctx_mut(&mut self) -> &mut TestContext {
        &mut self.ctx
    }

    /// Runs the full setup sequence: hooks, application creation, chain.
    pub fn setup(&mut self) -> FixtureResult<()> {
        debug!("harness setup");
        self.factory.before_setup();
        let mut app = self.factory.create_app()?;
        self.factory.after_create_app(&mut app);
        let app = Arc::new(app);
        self.chain.setup(&mut self.ctx, &app)?;
        self.factory.after_setup(&mut self.ctx);
        Ok(())
    }

    /// Runs the full teardown sequence: hooks around reverse-order chain
    /// teardown.
    pub fn teardown(&mut self) -> FixtureResult<()> {
        debug!("harness teardown");
        self.factory.before_teardown(&mut self.ctx);
        let result = self.chain.teardown(&mut self.ctx);
        self.factory.after_teardown();
        result
    }

    /// Runs [`setup`](Self::setup) when method-scoped; a no-op otherwise.
    pub fn setup_method(&mut self) -> FixtureResult<()> {
        match self.level {
            SetupLevel::Method => self.setup(),
            SetupLevel::Class => Ok(()),
        }
    }

    /// Runs [`teardown`](Self::teardown) when method-scoped; a no-op
    /// otherwise.
    pub fn teardown_method(&mut self) -> FixtureResult<()> {
        match self.level {
            SetupLevel::Method => self.teardown(),
            SetupLevel::Class => Ok(()),
        }
    }

    /// Runs [`setup`](Self::setup) when class-scoped; a no-op otherwise.
    pub fn setup_class(&mut self) -> FixtureResult<()> {
        match self.level {
            SetupLevel::Class => self.setup(),
            SetupLevel::Method => Ok(()),
        }
    }

    /// Runs [`teardown`](Self::teardown) when class-scoped; a no-op
    /// otherwise.
    pub fn teardown_class(&mut self) -> FixtureResult<()> {
        match self.level {
            SetupLevel::Class => self.teardown(),
            SetupLevel::Method => Ok(()),
        }
    }
}

impl<F: AppFactory> Drop for Harness<F> {
    /// Best-effort teardown of anything still set up, so a panicking test
    /// does not leak its fixtures.
    fn drop(&mut self) {
        if self.chain.is_active() {
            if let Err(err) = self.chain.teardown(&mut self.ctx) {
                debug!(error = %err, "fixture teardown failed during drop");
            }
        }
    }
}

/// A class-scoped harness shared by every test function in a module.
///
/// The wrapped [`Harness`] is created and set up exactly once, the first time
/// any test calls [`get`](Self::get); all tests then observe the same
/// application instance. Declare one as a `static`:
///
/// ```rust,ignore
/// static HARNESS: ClassHarness<MyApp> = ClassHarness::new();
///
/// #[tokio::test]
/// async fn test_something() {
///     let mut harness = HARNESS.get(|| MyApp);
///     // ...
/// }
/// ```
///
/// There is no reliable after-all-tests hook in the test runner, so the
/// shared fixtures live until process exit unless a test explicitly calls
/// `teardown_class`.
pub struct ClassHarness<F: AppFactory> {
    cell: OnceCell<Mutex<Harness<F>>>,
}

impl<F: AppFactory> Default for ClassHarness<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: AppFactory> ClassHarness<F> {
    /// Creates an empty, not-yet-initialized class harness.
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Returns the shared harness, creating and setting it up on first use.
    ///
    /// # Panics
    ///
    /// Panics if the one-time class-level setup fails.
    pub fn get(&self, make_factory: impl FnOnce() -> F) -> MutexGuard<'_, Harness<F>> {
        self.cell
            .get_or_init(|| {
                let mut harness = Harness::new(make_factory()).with_level(SetupLevel::Class);
                harness
                    .setup_class()
                    .expect("class-level fixture setup failed");
                Mutex::new(harness)
            })
            .lock()
            .expect("class harness lock poisoned")
    }
}
