//! Logging setup for binaries and tests.
//!
//! Library code never configures a logging backend itself — it only calls
//! the `log` facade macros (`log::warn!`, `log::debug!`, ...). This module
//! exists so the bundled CLI and integration tests have one place to wire a
//! concrete backend, the same role `console_log::init_with_level` played for
//! the teacher's WASM target.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize a simple env-driven logger exactly once per process. Safe to
/// call from every test; subsequent calls are no-ops.
#[cfg(feature = "cli")]
pub fn init_logging() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    });
}

#[cfg(not(feature = "cli"))]
pub fn init_logging() {
    INIT.call_once(|| {});
}
