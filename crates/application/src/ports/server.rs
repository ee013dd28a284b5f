//! Ephemeral server port

use std::future::Future;

use thiserror::Error;

/// The server did not reach the listening state.
#[derive(Debug, Error)]
pub enum ServerStartError {
    /// Binding or configuring the socket failed.
    #[error("Failed to start server: {0}")]
    Io(#[from] std::io::Error),

    /// The socket was not listening within the startup window.
    #[error("Failed to start server: not listening after {timeout_ms}ms")]
    Timeout {
        /// Startup window in milliseconds.
        timeout_ms: u64,
    },
}

/// Port for binding an application to a throwaway loopback port.
pub trait ServerLauncher: Send + Sync {
    /// The request handler type the launcher can serve.
    type App: Send + Sync;
    /// Handle to a started server.
    type Server: RunningServer;

    /// Starts serving `app` on an OS-assigned port.
    ///
    /// Resolves once the socket is listening, or fails if that does not
    /// happen within the launcher's startup window. There is no retry.
    ///
    /// # Errors
    ///
    /// Returns [`ServerStartError`] on bind failure or startup timeout.
    fn start(
        &self,
        app: &Self::App,
    ) -> impl Future<Output = Result<Self::Server, ServerStartError>> + Send;
}

/// A listening ephemeral server.
pub trait RunningServer: Send {
    /// Port the server is bound to.
    fn port(&self) -> u16;

    /// Stops accepting connections. Does not wait for in-flight
    /// connections to drain.
    fn stop(self);
}
