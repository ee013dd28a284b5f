//! Loopcheck Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus the tokio harness that
//! enforces per-test deadlines.

pub mod adapters;
pub mod config;
pub mod extensions;
pub mod harness;
pub mod server;

pub use adapters::ReqwestHttpClient;
pub use config::HarnessConfig;
pub use extensions::{BodyModifier, MODIFY_OPTION, register_modify, register_modify_with};
pub use harness::{DeadlineContext, TestHarness};
pub use server::{AxumServerLauncher, EphemeralServer};
