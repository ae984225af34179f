//! The application wrapper handed to the fixture chain.
//!
//! [`TestApp`] bundles everything one test's application instance consists of:
//! the axum router, an optional test database with its schema statements, and
//! the `template_rendered` signal. All of it lives in named fields on this
//! struct; nothing is looked up through a side registry.

use axum::Router;

use crate::db::TestDatabase;
use crate::signal::{Signal, TemplateSignal};
use std::sync::Arc;

/// One application instance, owned by the active test for the duration of a
/// setup/teardown cycle.
pub struct TestApp {
    router: Router,
    database: Option<TestDatabase>,
    schema: Vec<String>,
    template_rendered: TemplateSignal,
}

impl TestApp {
    /// Creates an application wrapper around the given router, with a fresh
    /// template signal and no database.
    pub fn new(router: Router) -> Self {
        Self {
            router,
            database: None,
            schema: Vec::new(),
            template_rendered: Arc::new(Signal::new()),
        }
    }

    /// Attaches a database to the application.
    #[must_use]
    pub fn with_database(mut self, database: TestDatabase) -> Self {
        self.database = Some(database);
        self
    }

    /// Sets the schema statements the database fixture runs at setup.
    #[must_use]
    pub fn with_schema<I, S>(mut self, statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema = statements.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the template signal.
    ///
    /// Routers whose handlers announce renders must be built against the same
    /// signal handle, so callers typically create the signal first, capture
    /// clones of it in their handlers, and pass it in here.
    #[must_use]
    pub fn with_template_signal(mut self, signal: TemplateSignal) -> Self {
        self.template_rendered = signal;
        self
    }

    /// Returns the router.
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the attached database, if any.
    pub const fn database(&self) -> Option<&TestDatabase> {
        self.database.as_ref()
    }

    /// Returns the schema statements.
    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Returns the signal fired on every template render.
    pub const fn template_rendered(&self) -> &TemplateSignal {
        &self.template_rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_database() {
        let app = TestApp::new(Router::new());
        assert!(app.database().is_none());
        assert!(app.schema().is_empty());
        assert_eq!(app.template_rendered().receiver_count(), 0);
    }

    #[test]
    fn test_with_database_and_schema() {
        let db = TestDatabase::memory().unwrap();
        let app = TestApp::new(Router::new())
            .with_database(db)
            .with_schema(["CREATE TABLE tags (id INTEGER PRIMARY KEY)"]);

        assert!(app.database().is_some());
        assert_eq!(app.schema().len(), 1);
    }

    #[test]
    fn test_with_template_signal_shares_handle() {
        let signal: TemplateSignal = Arc::new(Signal::new());
        let app = TestApp::new(Router::new()).with_template_signal(signal.clone());

        signal.connect("probe", Arc::new(|_: &crate::signal::RenderEvent| {}));
        assert_eq!(app.template_rendered().receiver_count(), 1);
    }
}
