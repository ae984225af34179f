//! The setup/teardown fixture chain.
//!
//! A [`Fixture`] is one independent layer of test-environment initialization
//! with symmetric `setup` and `teardown` operations. The built-in chain runs
//! three of them in declared order — application, database, view — and tears
//! them down in exact reverse order, so later fixtures may assume earlier
//! ones already established their preconditions.
//!
//! Fixtures are stateless; everything they produce (clients, captured render
//! events, the application handle) is stored on the owning [`TestContext`].
//!
//! If a fixture's setup fails mid-chain, [`FixtureChain::setup`] unwinds the
//! already-completed prefix before returning the error, so no resources leak
//! out of a failed setup. Teardown is tolerant of fixtures whose setup never
//! ran.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::app::TestApp;
use crate::assertions;
use crate::client::{JsonClient, TestClient};
use crate::error::{FixtureError, FixtureResult};
use crate::signal::RenderEvent;

/// Monotonic ids for render-capture subscriptions, so concurrently running
/// tests sharing a signal never collide.
static NEXT_RECEIVER_ID: AtomicUsize = AtomicUsize::new(0);

/// The state one test accumulates through fixture setup.
///
/// All fields start empty and are cleared again at teardown; nothing persists
/// across tests.
#[derive(Default)]
pub struct TestContext {
    app: Option<Arc<TestApp>>,
    client: Option<TestClient>,
    json_client: Option<JsonClient>,
    templates: Arc<Mutex<Vec<RenderEvent>>>,
    receiver_id: Option<String>,
}

impl TestContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the application handle.
    ///
    /// # Panics
    ///
    /// Panics if the application fixture has not run.
    pub fn app(&self) -> &Arc<TestApp> {
        self.app.as_ref().expect("application fixture has not run")
    }

    /// Returns the application handle if the application fixture has run.
    pub const fn try_app(&self) -> Option<&Arc<TestApp>> {
        self.app.as_ref()
    }

    /// Returns the plain test client.
    ///
    /// # Panics
    ///
    /// Panics if the view fixture has not run.
    pub fn client(&mut self) -> &mut TestClient {
        self.client.as_mut().expect("view fixture has not run")
    }

    /// Returns the JSON test client.
    ///
    /// # Panics
    ///
    /// Panics if the view fixture has not run.
    pub fn json_client(&mut self) -> &mut JsonClient {
        self.json_client.as_mut().expect("view fixture has not run")
    }

    /// Returns `true` if the view fixture's clients are currently open.
    pub const fn has_clients(&self) -> bool {
        self.client.is_some() && self.json_client.is_some()
    }

    /// Returns a snapshot of the render events captured so far.
    pub fn templates(&self) -> Vec<RenderEvent> {
        self.templates
            .lock()
            .expect("render capture lock poisoned")
            .clone()
    }

    /// Asserts that the named template was rendered during this test.
    ///
    /// # Panics
    ///
    /// Panics if no captured render used the template.
    pub fn assert_template_used(&self, name: &str) {
        assertions::assert_template_used(&self.templates(), name);
    }

    /// Returns a variable from the context of any captured render.
    ///
    /// Returns [`FixtureError::ContextVariableNotFound`] if no render carried
    /// the variable.
    pub fn get_context_variable(&self, name: &str) -> FixtureResult<serde_json::Value> {
        assertions::get_context_variable(&self.templates(), name)
    }

    /// Asserts that a context variable was rendered with the given value.
    ///
    /// # Panics
    ///
    /// Panics if the variable is absent or has a different value.
    pub fn assert_context(&self, name: &str, expected: &serde_json::Value) {
        assertions::assert_context(&self.templates(), name, expected);
    }
}

/// One independent setup/teardown unit in the fixture chain.
pub trait Fixture: Send + Sync {
    /// A short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Performs one layer of initialization, storing handles on `ctx`.
    fn setup(&self, ctx: &mut TestContext, app: &Arc<TestApp>) -> FixtureResult<()>;

    /// Reverses exactly what the matching `setup` did.
    ///
    /// Must tolerate a setup that never ran.
    fn teardown(&self, ctx: &mut TestContext) -> FixtureResult<()>;
}

/// Stores the application handle on the context and clears it at teardown.
///
/// Runs first so the database and view fixtures can assume an application is
/// present.
#[derive(Debug, Default)]
pub struct AppFixture;

impl Fixture for AppFixture {
    fn name(&self) -> &'static str {
        "application"
    }

    fn setup(&self, ctx: &mut TestContext, app: &Arc<TestApp>) -> FixtureResult<()> {
        ctx.app = Some(Arc::clone(app));
        Ok(())
    }

    fn teardown(&self, ctx: &mut TestContext) -> FixtureResult<()> {
        ctx.app = None;
        Ok(())
    }
}

/// Creates the application's schema at setup and purges it at teardown.
///
/// An application without an attached database is skipped; a context whose
/// application fixture never ran is an error at setup but already-clean at
/// teardown.
#[derive(Debug, Clone, Copy)]
pub struct DatabaseFixture {
    /// Whether to create tables at setup and drop them at teardown.
    pub setup_tables: bool,
    /// Whether to purge row data at teardown.
    pub teardown_delete_data: bool,
}

impl Default for DatabaseFixture {
    fn default() -> Self {
        Self {
            setup_tables: true,
            teardown_delete_data: true,
        }
    }
}

impl Fixture for DatabaseFixture {
    fn name(&self) -> &'static str {
        "database"
    }

    fn setup(&self, ctx: &mut TestContext, _app: &Arc<TestApp>) -> FixtureResult<()> {
        let app = ctx
            .app
            .as_ref()
            .ok_or_else(|| FixtureError::setup(self.name(), "application fixture has not run"))?;

        let Some(db) = app.database() else {
            debug!("application has no database attached, skipping schema setup");
            return Ok(());
        };

        if self.setup_tables {
            for statement in app.schema() {
                db.execute(statement)?;
            }
        }
        Ok(())
    }

    fn teardown(&self, ctx: &mut TestContext) -> FixtureResult<()> {
        // Absence of the app or the database means there is nothing to clean.
        let Some(app) = ctx.app.as_ref() else {
            return Ok(());
        };
        let Some(db) = app.database() else {
            return Ok(());
        };

        if self.teardown_delete_data {
            db.delete_all_rows()?;
        }
        if self.setup_tables {
            db.drop_all_tables()?;
        }
        Ok(())
    }
}

/// Opens the test clients and captures template renders.
///
/// Setup subscribes a receiver on the application's `template_rendered`
/// signal that appends every event to the context's capture list; teardown
/// disconnects it, drops both clients, and clears the captures.
#[derive(Debug, Default)]
pub struct ViewFixture;

impl Fixture for ViewFixture {
    fn name(&self) -> &'static str {
        "view"
    }

    fn setup(&self, ctx: &mut TestContext, _app: &Arc<TestApp>) -> FixtureResult<()> {
        let app = Arc::clone(
            ctx.app
                .as_ref()
                .ok_or_else(|| FixtureError::setup(self.name(), "application fixture has not run"))?,
        );

        ctx.client = Some(TestClient::new(app.router().clone()));
        ctx.json_client = Some(JsonClient::new(TestClient::new(app.router().clone())));

        let id = format!(
            "render-capture-{}",
            NEXT_RECEIVER_ID.fetch_add(1, Ordering::Relaxed)
        );
        let sink = Arc::clone(&ctx.templates);
        app.template_rendered().connect(
            id.clone(),
            Arc::new(move |event: &RenderEvent| {
                sink.lock()
                    .expect("render capture lock poisoned")
                    .push(event.clone());
            }),
        );
        ctx.receiver_id = Some(id);
        Ok(())
    }

    fn teardown(&self, ctx: &mut TestContext) -> FixtureResult<()> {
        if let Some(id) = ctx.receiver_id.take() {
            if let Some(app) = ctx.app.as_ref() {
                app.template_rendered().disconnect(&id);
            }
        }
        ctx.client = None;
        ctx.json_client = None;
        ctx.templates
            .lock()
            .expect("render capture lock poisoned")
            .clear();
        Ok(())
    }
}

/// An ordered chain of fixtures with reverse-order teardown.
pub struct FixtureChain {
    fixtures: Vec<Box<dyn Fixture>>,
    completed: usize,
}

impl Default for FixtureChain {
    /// The standard chain: application, then database, then view.
    fn default() -> Self {
        Self::new(vec![
            Box::new(AppFixture),
            Box::new(DatabaseFixture::default()),
            Box::new(ViewFixture),
        ])
    }
}

impl FixtureChain {
    /// Creates a chain over the given fixtures, run in the given order.
    pub fn new(fixtures: Vec<Box<dyn Fixture>>) -> Self {
        Self {
            fixtures,
            completed: 0,
        }
    }

    /// Returns `true` if at least one fixture is currently set up.
    pub const fn is_active(&self) -> bool {
        self.completed > 0
    }

    /// Runs every fixture's setup in declared order.
    ///
    /// On failure the already-completed prefix is unwound in reverse order
    /// (teardown errors are logged and swallowed) and the setup error is
    /// returned.
    pub fn setup(&mut self, ctx: &mut TestContext, app: &Arc<TestApp>) -> FixtureResult<()> {
        for index in 0..self.fixtures.len() {
            let fixture = &self.fixtures[index];
            debug!(fixture = fixture.name(), "fixture setup");
            if let Err(err) = fixture.setup(ctx, app) {
                warn!(
                    fixture = fixture.name(),
                    error = %err,
                    "fixture setup failed, unwinding completed fixtures"
                );
                self.unwind(ctx);
                return Err(err);
            }
            self.completed = index + 1;
        }
        Ok(())
    }

    /// Runs teardown over the completed fixtures in reverse order.
    ///
    /// A teardown error does not stop the remaining fixtures from clearing
    /// their state; the first error is returned once the chain is done.
    pub fn teardown(&mut self, ctx: &mut TestContext) -> FixtureResult<()> {
        let mut first_err = None;
        for fixture in self.fixtures[..self.completed].iter().rev() {
            debug!(fixture = fixture.name(), "fixture teardown");
            if let Err(err) = fixture.teardown(ctx) {
                warn!(fixture = fixture.name(), error = %err, "fixture teardown failed");
                first_err.get_or_insert(err);
            }
        }
        self.completed = 0;
        first_err.map_or(Ok(()), Err)
    }

    fn unwind(&mut self, ctx: &mut TestContext) {
        for fixture in self.fixtures[..self.completed].iter().rev() {
            if let Err(err) = fixture.teardown(ctx) {
                warn!(
                    fixture = fixture.name(),
                    error = %err,
                    "fixture teardown failed during unwind"
                );
            }
        }
        self.completed = 0;
    }
}
