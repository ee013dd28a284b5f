//! Loopcheck Domain - Core harness types
//!
//! This crate defines the declarative model of an integration test case:
//! what request to send, what response to expect, and how the two are
//! compared. All types here are pure Rust with no I/O dependencies.

pub mod case;
pub mod duration;
pub mod error;
pub mod request;
pub mod response;
pub mod testing;

pub use case::{CaseOptions, RequiredField};
pub use duration::parse_duration;
pub use error::{DomainError, DomainResult};
pub use request::{HttpMethod, RequestSpec, ResponseType};
pub use response::{CapturedResponse, HeaderExpectation, ResponseExpectation, ResponseHeaders};
pub use testing::{AssertionError, HeaderMatcher, ResponseAsserter, structurally_equal};
