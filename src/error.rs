//! Error types for axum-fixture.
//!
//! [`FixtureError`] covers the failure modes of the fixture chain and its
//! helpers: database errors, JSON (de)serialization errors, fixture setup
//! failures, and the distinct context-variable-not-found case used by the
//! template assertions.

use thiserror::Error;

/// The error type for fixture setup, teardown, and assertion helpers.
#[derive(Error, Debug)]
pub enum FixtureError {
    /// A template context lookup failed because the variable is absent.
    ///
    /// This is deliberately distinct from an assertion failure so callers can
    /// tell "wrong value" apart from "variable never rendered".
    #[error("context variable does not exist: {0}")]
    ContextVariableNotFound(String),

    /// A database operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A fixture could not be set up.
    #[error("fixture '{fixture}' setup failed: {message}")]
    Setup {
        /// The name of the fixture whose setup failed.
        fixture: &'static str,
        /// A human-readable description of the failure.
        message: String,
    },

    /// The test case is misconfigured.
    #[error("invalid test configuration: {0}")]
    Configuration(String),
}

impl FixtureError {
    /// Creates a setup error for the named fixture.
    pub fn setup(fixture: &'static str, message: impl Into<String>) -> Self {
        Self::Setup {
            fixture,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type FixtureResult<T> = Result<T, FixtureError>;
