//! Request description types

mod method;
mod spec;

pub use method::HttpMethod;
pub use spec::{RequestSpec, ResponseType, deep_extend};
