//! Run Test Case Use Case
//!
//! Drives a single integration check: start a throwaway server for the
//! application, send one request, stop the server, assert the response.
//! Registered extension hooks and the case's own callbacks run at fixed
//! points around the request.

use std::fmt;
use std::sync::Arc;

use loopcheck_domain::{
    CaseOptions, RequestSpec, RequiredField, ResponseAsserter, ResponseExpectation, parse_duration,
};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{CaseError, CaseResult};
use crate::extensions::{CaseHook, CaseHookContext, ExtensionRegistry, FnHook, HookResult};
use crate::ports::{HttpClient, RunningServer, ServerLauncher, TestContext};

/// A declarative integration check against application `A`.
///
/// `app`, `opts.req` and `opts.res` are required; a case missing any of
/// them fails before anything is started.
pub struct TestCase<A> {
    /// Application under test
    pub app: Option<A>,
    /// Request, expectation and extension options
    pub opts: CaseOptions,
    /// Callback run before extension `before` hooks
    pub before: Option<Arc<dyn CaseHook>>,
    /// Callback run after the assertions pass
    pub after: Option<Arc<dyn CaseHook>>,
}

impl<A> TestCase<A> {
    /// Creates a case for `app` with nothing else set.
    #[must_use]
    pub fn new(app: A) -> Self {
        Self {
            app: Some(app),
            ..Self::default()
        }
    }

    /// Sets the request.
    #[must_use]
    pub fn req(mut self, req: RequestSpec) -> Self {
        self.opts.req = Some(req);
        self
    }

    /// Sets the response expectation.
    #[must_use]
    pub fn res(mut self, res: ResponseExpectation) -> Self {
        self.opts.res = Some(res);
        self
    }

    /// Sets the per-test timeout, e.g. `"5s"`.
    #[must_use]
    pub fn timeout(mut self, timeout: impl Into<String>) -> Self {
        self.opts.timeout = Some(timeout.into());
        self
    }

    /// Sets the base request merged under `req`.
    #[must_use]
    pub fn defaults(mut self, defaults: RequestSpec) -> Self {
        self.opts.defaults = Some(defaults);
        self
    }

    /// Supplies an extension option.
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.opts.set_option(name, value);
        self
    }

    /// Sets the case's `before` callback.
    #[must_use]
    pub fn before(mut self, hook: impl CaseHook + 'static) -> Self {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Sets the case's `before` callback from a closure.
    #[must_use]
    pub fn before_fn<F>(self, f: F) -> Self
    where
        F: Fn(CaseHookContext<'_>) -> HookResult + Send + Sync + 'static,
    {
        self.before(FnHook(f))
    }

    /// Sets the case's `after` callback.
    #[must_use]
    pub fn after(mut self, hook: impl CaseHook + 'static) -> Self {
        self.after = Some(Arc::new(hook));
        self
    }

    /// Sets the case's `after` callback from a closure.
    #[must_use]
    pub fn after_fn<F>(self, f: F) -> Self
    where
        F: Fn(CaseHookContext<'_>) -> HookResult + Send + Sync + 'static,
    {
        self.after(FnHook(f))
    }
}

impl<A> Default for TestCase<A> {
    fn default() -> Self {
        Self {
            app: None,
            opts: CaseOptions::default(),
            before: None,
            after: None,
        }
    }
}

impl<A: Clone> Clone for TestCase<A> {
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            opts: self.opts.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}

impl<A> fmt::Debug for TestCase<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("app", &self.app.is_some())
            .field("opts", &self.opts)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// Use case for running test cases.
///
/// Owns the server launcher and HTTP client ports plus a handle to the
/// extension registry. Concurrent runs only share the registry, which is
/// read-only while cases execute.
///
/// # Example
///
/// ```ignore
/// let runner = TestCaseRunner::new(launcher, client, ExtensionRegistry::global());
/// let case = TestCase::new(app)
///     .req(RequestSpec::get("/"))
///     .res(ResponseExpectation::new().status(200));
/// runner.run(case, &context).await?;
/// ```
pub struct TestCaseRunner<L, C> {
    launcher: L,
    client: C,
    registry: Arc<ExtensionRegistry>,
}

impl<L: ServerLauncher, C: HttpClient> TestCaseRunner<L, C> {
    /// Creates a runner.
    pub const fn new(launcher: L, client: C, registry: Arc<ExtensionRegistry>) -> Self {
        Self {
            launcher,
            client,
            registry,
        }
    }

    /// The registry whose hooks this runner invokes.
    pub const fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    /// Runs one case to completion.
    ///
    /// Steps, strictly in order: validate, apply the timeout, build the
    /// effective request, case `before`, extension `before` hooks, start the
    /// server, send the request, stop the server, `each` hooks, extension
    /// `after` hooks, assertions, case `after`. The first error ends the
    /// run.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError`] for a missing field, a bad timeout, a server
    /// that will not start, a failed request, a failing hook or a failed
    /// assertion.
    pub async fn run<X>(&self, case: TestCase<L::App>, cx: &X) -> CaseResult<()>
    where
        X: TestContext + ?Sized,
    {
        let run_id = Uuid::now_v7();
        self.run_inner(case, cx)
            .instrument(tracing::info_span!("test_case", %run_id))
            .await
    }

    async fn run_inner<X>(&self, case: TestCase<L::App>, cx: &X) -> CaseResult<()>
    where
        X: TestContext + ?Sized,
    {
        let TestCase {
            app,
            mut opts,
            before,
            after,
        } = case;

        let app = app.ok_or(CaseError::MissingField(RequiredField::App))?;
        let req = opts
            .req
            .as_ref()
            .ok_or(CaseError::MissingField(RequiredField::Req))?;
        if opts.res.is_none() {
            return Err(CaseError::MissingField(RequiredField::Res));
        }

        if let Some(timeout) = &opts.timeout {
            cx.set_timeout(parse_duration(timeout)?);
        }

        let mut req = RequestSpec::effective(opts.defaults.as_ref(), req);
        let hooks = self.registry.snapshot();

        if let Some(before) = &before {
            before
                .call(CaseHookContext {
                    req: &mut req,
                    res: None,
                    opts: &mut opts.clone(),
                })
                .await?;
        }

        for (name, hook) in &hooks.before {
            if let Some(value) = opts.option(name).cloned() {
                tracing::debug!(extension = %name, "running before hook");
                hook.before(&value, &mut req, &mut opts).await?;
            }
        }

        let server = self.launcher.start(&app).await?;
        let base_url = format!("http://127.0.0.1:{}/", server.port());
        tracing::debug!(method = %req.method(), url = req.url(), %base_url, "sending request");
        let result = self.client.execute(&base_url, &req).await;
        server.stop();
        let mut response = result?;
        tracing::debug!(status = response.status, "response captured");

        for (name, hook) in &hooks.each {
            tracing::debug!(extension = %name, "running each hook");
            hook.each(&req, &mut response, &mut opts).await?;
        }

        for (name, hook) in &hooks.after {
            if let Some(value) = opts.option(name).cloned() {
                tracing::debug!(extension = %name, "running after hook");
                hook.after(&value, &mut req, &mut opts).await?;
            }
        }

        if let Some(expectation) = &opts.res {
            ResponseAsserter::assert(expectation, &response, req.effective_response_type())?;
        }

        if let Some(after) = &after {
            after
                .call(CaseHookContext {
                    req: &mut req,
                    res: Some(&response),
                    opts: &mut opts.clone(),
                })
                .await?;
        }

        Ok(())
    }
}
