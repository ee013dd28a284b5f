//! Ephemeral axum server.
//!
//! Binds an application to an OS-assigned loopback port for the duration of
//! one test case.

use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::Router;
use loopcheck_application::ports::{RunningServer, ServerLauncher, ServerStartError};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::config::HarnessConfig;

/// Starts an [`EphemeralServer`] per case.
#[derive(Debug, Clone)]
pub struct AxumServerLauncher {
    startup_timeout: Duration,
}

impl AxumServerLauncher {
    /// Creates a launcher with the given startup window.
    #[must_use]
    pub const fn new(startup_timeout: Duration) -> Self {
        Self { startup_timeout }
    }

    /// Creates a launcher from the harness configuration.
    #[must_use]
    pub const fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.startup_timeout())
    }

    /// The startup window.
    #[must_use]
    pub const fn startup_timeout(&self) -> Duration {
        self.startup_timeout
    }
}

impl Default for AxumServerLauncher {
    fn default() -> Self {
        Self::from_config(&HarnessConfig::default())
    }
}

impl ServerLauncher for AxumServerLauncher {
    type App = Router;
    type Server = EphemeralServer;

    async fn start(&self, app: &Router) -> Result<EphemeralServer, ServerStartError> {
        within(self.startup_timeout, EphemeralServer::bind(app.clone())).await
    }
}

/// Awaits `bind` for at most `window`.
async fn within<T, F>(window: Duration, bind: F) -> Result<T, ServerStartError>
where
    F: Future<Output = io::Result<T>>,
{
    let timeout_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
    tokio::time::timeout(window, bind)
        .await
        .map_err(|_| ServerStartError::Timeout { timeout_ms })?
        .map_err(ServerStartError::from)
}

/// A router served on `127.0.0.1` at a port picked by the OS.
///
/// The server stops when [`RunningServer::stop`] is called or the handle is
/// dropped. Connections already accepted are not waited for.
#[derive(Debug)]
pub struct EphemeralServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl EphemeralServer {
    /// Binds a loopback listener and starts serving `app` in the
    /// background. Returns once the socket is listening.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the socket cannot be bound.
    pub async fn bind(app: Router) -> io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        let (shutdown, signal) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = signal.await;
            });
            if let Err(error) = serve.await {
                tracing::warn!(%addr, %error, "ephemeral server failed");
            }
        });

        tracing::debug!(%addr, "ephemeral server listening");
        Ok(Self {
            addr,
            shutdown: Some(shutdown),
        })
    }

    /// Address the server is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    fn shutdown(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
            tracing::debug!(addr = %self.addr, "ephemeral server stopped");
        }
    }
}

impl RunningServer for EphemeralServer {
    fn port(&self) -> u16 {
        self.addr.port()
    }

    fn stop(mut self) {
        self.shutdown();
    }
}

impl Drop for EphemeralServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
