//! Loopcheck - integration checks for axum applications
//!
//! Each check serves the application on a throwaway loopback port, sends a
//! single request, stops the server and asserts the response.
//!
//! ```ignore
//! use loopcheck::prelude::*;
//!
//! #[tokio::test]
//! async fn root_says_hello() -> Result<(), Box<dyn std::error::Error>> {
//!     TestHarness::new()?
//!         .run(
//!             TestCase::new(app())
//!                 .req(RequestSpec::get("/"))
//!                 .res(ResponseExpectation::new().status(200).data("hello")),
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

pub use loopcheck_application as application;
pub use loopcheck_domain as domain;
pub use loopcheck_infrastructure as infrastructure;

pub use loopcheck_application::{
    CaseError, CaseResult, ExtensionHooks, ExtensionRegistry, HookError, RegistrationError,
    TestCase, TestCaseRunner,
};
pub use loopcheck_domain::{
    AssertionError, CapturedResponse, HeaderExpectation, HttpMethod, RequestSpec,
    ResponseExpectation, ResponseType,
};
pub use loopcheck_infrastructure::{
    HarnessConfig, MODIFY_OPTION, TestHarness, register_modify, register_modify_with,
};

/// Registers hooks under `name` in the process-wide registry.
///
/// # Errors
///
/// Returns [`RegistrationError`] if the name is empty, reserved or taken.
pub fn register(name: &str, hooks: ExtensionHooks) -> Result<(), RegistrationError> {
    ExtensionRegistry::global().register(name, hooks)
}

/// Everything a test file usually needs.
pub mod prelude {
    pub use crate::{
        CaseError, ExtensionHooks, HeaderExpectation, HttpMethod, RequestSpec,
        ResponseExpectation, ResponseType, TestCase, TestHarness,
    };
}
