//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the test-case runner and the outside
//! world. Each port is a trait implemented by an adapter in the
//! infrastructure layer.

mod http_client;
mod server;
mod test_context;

pub use http_client::{HttpClient, HttpClientError};
pub use server::{RunningServer, ServerLauncher, ServerStartError};
pub use test_context::TestContext;
