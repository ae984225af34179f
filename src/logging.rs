//! Tracing setup for tests.
//!
//! The fixture chain emits `tracing` events at every setup and teardown step.
//! Call [`init`] at the top of a test to see them; the subscriber is
//! installed at most once per process, so repeated calls across tests are
//! safe.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a test-friendly tracing subscriber.
///
/// The filter is read from `RUST_LOG`, defaulting to `info`. Output goes
/// through the test writer so it is captured per test.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_test_writer()
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        tracing::debug!("still alive after double init");
    }
}
