//! Tokio-side test runner with a per-test deadline.
//!
//! [`TestHarness`] wires the [`TestCaseRunner`] to the axum launcher and the
//! reqwest client, and races every run against a deadline that the case
//! itself may move through [`TestContext::set_timeout`].

use std::future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use loopcheck_application::ports::{HttpClientError, TestContext};
use loopcheck_application::{CaseError, CaseResult, ExtensionRegistry, TestCase, TestCaseRunner};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::adapters::ReqwestHttpClient;
use crate::config::HarnessConfig;
use crate::server::AxumServerLauncher;

/// When the running case expires, and the timeout that set it.
pub type Deadline = Option<(Instant, Duration)>;

/// [`TestContext`] backed by a watch channel.
///
/// Holds the deadline of one run. A zero timeout clears it.
#[derive(Debug)]
pub struct DeadlineContext {
    deadline: watch::Sender<Deadline>,
}

impl DeadlineContext {
    /// Creates a context whose deadline is `timeout` from now.
    #[must_use]
    pub fn new(timeout: Duration) -> (Self, watch::Receiver<Deadline>) {
        let (deadline, rx) = watch::channel(deadline_from_now(timeout));
        (Self { deadline }, rx)
    }

    /// The timeout currently in force, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.deadline.borrow().map(|(_, timeout)| timeout)
    }
}

impl TestContext for DeadlineContext {
    fn set_timeout(&self, timeout: Duration) {
        tracing::debug!(timeout_ms = timeout.as_millis(), "test timeout changed");
        self.deadline.send_replace(deadline_from_now(timeout));
    }
}

fn deadline_from_now(timeout: Duration) -> Deadline {
    (!timeout.is_zero()).then(|| (Instant::now() + timeout, timeout))
}

async fn expire(deadline: Deadline) -> Duration {
    match deadline {
        Some((at, timeout)) => {
            tokio::time::sleep_until(at).await;
            timeout
        }
        None => future::pending().await,
    }
}

/// Runs test cases against axum routers.
///
/// # Example
///
/// ```ignore
/// let harness = TestHarness::new()?;
/// harness
///     .run(
///         TestCase::new(app)
///             .req(RequestSpec::get("/"))
///             .res(ResponseExpectation::new().status(200)),
///     )
///     .await?;
/// ```
pub struct TestHarness {
    runner: TestCaseRunner<AxumServerLauncher, ReqwestHttpClient>,
    default_timeout: Duration,
}

impl TestHarness {
    /// Creates a harness with the default configuration and the global
    /// extension registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::from_config(&HarnessConfig::default(), ExtensionRegistry::global())
    }

    /// Creates a harness from `config` invoking the hooks in `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(
        config: &HarnessConfig,
        registry: Arc<ExtensionRegistry>,
    ) -> Result<Self, HttpClientError> {
        let runner = TestCaseRunner::new(
            AxumServerLauncher::from_config(config),
            ReqwestHttpClient::from_config(config)?,
            registry,
        );
        Ok(Self {
            runner,
            default_timeout: config.default_timeout(),
        })
    }

    /// The extension registry in use.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ExtensionRegistry> {
        self.runner.registry()
    }

    /// Timeout each run starts with.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Runs `case` under the per-test deadline.
    ///
    /// # Errors
    ///
    /// Returns whatever the run fails with, or [`CaseError::Timeout`] if the
    /// deadline passes first. A timed-out run is dropped, which also stops
    /// its server.
    pub async fn run(&self, case: TestCase<Router>) -> CaseResult<()> {
        let (cx, mut deadline) = DeadlineContext::new(self.default_timeout);
        let run = self.runner.run(case, &cx);
        tokio::pin!(run);

        loop {
            let current = *deadline.borrow_and_update();
            tokio::select! {
                biased;
                result = &mut run => return result,
                Ok(()) = deadline.changed() => {}
                timeout = expire(current) => return Err(CaseError::Timeout(timeout)),
            }
        }
    }
}

impl std::fmt::Debug for TestHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestHarness")
            .field("registry", self.registry())
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}
