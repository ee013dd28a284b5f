//! Test-runner context port

use std::time::Duration;

/// The surrounding test runner, as seen from inside a running case.
pub trait TestContext: Send + Sync {
    /// Replaces the per-test timeout of the case being run.
    fn set_timeout(&self, timeout: Duration);
}
