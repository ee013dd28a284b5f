//! Harness configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default time allowed for the ephemeral server to start listening.
pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 1000;

/// Default per-test timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Settings for the harness adapters.
///
/// Every field has a default, so a partial document deserializes:
///
/// ```
/// use loopcheck_infrastructure::HarnessConfig;
///
/// let config: HarnessConfig = serde_json::from_str(r#"{"defaultTimeoutMs": 500}"#).unwrap();
/// assert_eq!(config.default_timeout_ms, 500);
/// assert_eq!(config.startup_timeout_ms, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HarnessConfig {
    /// Milliseconds the server may take to start listening
    pub startup_timeout_ms: u64,
    /// Per-test timeout in milliseconds; zero disables it
    pub default_timeout_ms: u64,
    /// `User-Agent` sent with every request
    pub user_agent: String,
}

impl HarnessConfig {
    /// Startup window as a [`Duration`].
    #[must_use]
    pub const fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    /// Per-test timeout as a [`Duration`].
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            startup_timeout_ms: DEFAULT_STARTUP_TIMEOUT_MS,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: format!("loopcheck/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
