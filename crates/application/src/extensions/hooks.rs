//! Hook traits and closure adapters

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use loopcheck_domain::{CapturedResponse, CaseOptions, RequestSpec};
use serde_json::Value;
use thiserror::Error;

/// Error returned by a hook. Aborts the running case.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl HookError {
    /// Creates an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type alias for hooks.
pub type HookResult = Result<(), HookError>;

/// Runs before the server starts, when the case carries the option.
#[async_trait]
pub trait BeforeHook: Send + Sync {
    /// `value` is the case's option value. `req` is the effective request
    /// and may be rewritten.
    async fn before(&self, value: &Value, req: &mut RequestSpec, opts: &mut CaseOptions)
    -> HookResult;
}

/// Runs after the response is captured, when the case carries the option.
///
/// Receives the request, like [`BeforeHook`], not the response.
#[async_trait]
pub trait AfterHook: Send + Sync {
    /// `value` is the case's option value.
    async fn after(&self, value: &Value, req: &mut RequestSpec, opts: &mut CaseOptions)
    -> HookResult;
}

/// Runs on every case once the response is captured.
#[async_trait]
pub trait EachHook: Send + Sync {
    /// May rewrite the captured response before it is asserted.
    async fn each(
        &self,
        req: &RequestSpec,
        res: &mut CapturedResponse,
        opts: &mut CaseOptions,
    ) -> HookResult;
}

/// What a case's own `before`/`after` callback sees.
pub struct CaseHookContext<'a> {
    /// The effective request.
    pub req: &'a mut RequestSpec,
    /// The captured response; `None` in `before`.
    pub res: Option<&'a CapturedResponse>,
    /// A copy of the case options; changes do not reach the run.
    pub opts: &'a mut CaseOptions,
}

/// A case's own `before` or `after` callback.
#[async_trait]
pub trait CaseHook: Send + Sync {
    /// Runs the callback.
    async fn call(&self, cx: CaseHookContext<'_>) -> HookResult;
}

/// Adapts a plain closure into a hook.
pub struct FnHook<F>(pub F);

impl<F> fmt::Debug for FnHook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHook")
    }
}

#[async_trait]
impl<F> BeforeHook for FnHook<F>
where
    F: Fn(&Value, &mut RequestSpec, &mut CaseOptions) -> HookResult + Send + Sync,
{
    async fn before(
        &self,
        value: &Value,
        req: &mut RequestSpec,
        opts: &mut CaseOptions,
    ) -> HookResult {
        (self.0)(value, req, opts)
    }
}

#[async_trait]
impl<F> AfterHook for FnHook<F>
where
    F: Fn(&Value, &mut RequestSpec, &mut CaseOptions) -> HookResult + Send + Sync,
{
    async fn after(&self, value: &Value, req: &mut RequestSpec, opts: &mut CaseOptions) -> HookResult {
        (self.0)(value, req, opts)
    }
}

#[async_trait]
impl<F> EachHook for FnHook<F>
where
    F: Fn(&RequestSpec, &mut CapturedResponse, &mut CaseOptions) -> HookResult + Send + Sync,
{
    async fn each(
        &self,
        req: &RequestSpec,
        res: &mut CapturedResponse,
        opts: &mut CaseOptions,
    ) -> HookResult {
        (self.0)(req, res, opts)
    }
}

#[async_trait]
impl<F> CaseHook for FnHook<F>
where
    F: Fn(CaseHookContext<'_>) -> HookResult + Send + Sync,
{
    async fn call(&self, cx: CaseHookContext<'_>) -> HookResult {
        (self.0)(cx)
    }
}

/// Hooks supplied when registering an extension option.
#[derive(Clone, Default)]
pub struct ExtensionHooks {
    pub(crate) before: Option<Arc<dyn BeforeHook>>,
    pub(crate) after: Option<Arc<dyn AfterHook>>,
    pub(crate) each: Option<Arc<dyn EachHook>>,
}

impl ExtensionHooks {
    /// No hooks yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `before` hook.
    #[must_use]
    pub fn before(mut self, hook: impl BeforeHook + 'static) -> Self {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Sets the `before` hook from a closure.
    #[must_use]
    pub fn before_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &mut RequestSpec, &mut CaseOptions) -> HookResult + Send + Sync + 'static,
    {
        self.before(FnHook(f))
    }

    /// Sets the `after` hook.
    #[must_use]
    pub fn after(mut self, hook: impl AfterHook + 'static) -> Self {
        self.after = Some(Arc::new(hook));
        self
    }

    /// Sets the `after` hook from a closure.
    #[must_use]
    pub fn after_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &mut RequestSpec, &mut CaseOptions) -> HookResult + Send + Sync + 'static,
    {
        self.after(FnHook(f))
    }

    /// Sets the `each` hook.
    #[must_use]
    pub fn each(mut self, hook: impl EachHook + 'static) -> Self {
        self.each = Some(Arc::new(hook));
        self
    }

    /// Sets the `each` hook from a closure.
    #[must_use]
    pub fn each_fn<F>(self, f: F) -> Self
    where
        F: Fn(&RequestSpec, &mut CapturedResponse, &mut CaseOptions) -> HookResult
            + Send
            + Sync
            + 'static,
    {
        self.each(FnHook(f))
    }

    /// Returns true if no hook is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none() && self.each.is_none()
    }
}

impl fmt::Debug for ExtensionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionHooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("each", &self.each.is_some())
            .finish()
    }
}
