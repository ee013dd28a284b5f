//! Loopcheck Application - Test-case orchestration and ports
//!
//! This crate defines the application layer with:
//! - Port traits (HTTP client, ephemeral server, test-runner timeout)
//! - The extension registry and hook traits
//! - The test-case runner that drives one request/response check

pub mod error;
pub mod extensions;
pub mod ports;
pub mod run_case;

pub use error::{CaseError, CaseResult};
pub use extensions::{
    AfterHook, BeforeHook, CaseHook, CaseHookContext, EachHook, ExtensionHooks,
    ExtensionRegistry, FnHook, HookError, HookResult, HookSnapshot, RegistrationError,
};
pub use ports::{
    HttpClient, HttpClientError, RunningServer, ServerLauncher, ServerStartError, TestContext,
};
pub use run_case::{TestCase, TestCaseRunner};
