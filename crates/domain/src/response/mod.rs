//! Response types: what came back, and what was expected

mod expectation;
mod spec;

pub use expectation::{HeaderExpectation, ResponseExpectation};
pub use spec::{CapturedResponse, ResponseHeaders};
