//! Shared fixtures for the gateway's cross-crate integration tests.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

/// Install a test-scoped tracing subscriber. Safe to call from multiple
/// tests; `tracing_test` tolerates repeated init within one process.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Create a temporary directory for tests that need a `data_dir`.
pub fn create_temp_dir() -> std::path::PathBuf {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    temp_dir.into_path()
}
