//! Graceful Shutdown Handler
//!
//! Handles OS signals and disposes the runtime application.

use super::{LifecycleError, Result, RuntimeApplication};
use tokio::signal;

/// Disposes a runtime application once the process is asked to stop
///
/// # Example
///
/// ```rust,ignore
/// use wiring::RuntimeApplication;
///
/// let app = RuntimeApplication::builder().modules(modules).build()?;
/// app.start().await?;
///
/// tokio::spawn(async move {
///     if let Err(e) = app.shutdown_handler().wait_for_shutdown().await {
///         tracing::error!("Shutdown failed: {}", e);
///     }
///     std::process::exit(0);
/// });
/// ```
pub struct ShutdownHandler {
    application: RuntimeApplication,
}

impl ShutdownHandler {
    pub fn new(application: RuntimeApplication) -> Self {
        Self { application }
    }

    /// Wait for Ctrl+C or SIGTERM, then dispose the application.
    ///
    /// The application is disposed even when the signal listener cannot be installed.
    pub async fn wait_for_shutdown(&self) -> Result<()> {
        let signal = shutdown_signal().await;
        if let Err(e) = &signal {
            tracing::error!("{}", e);
        }

        tracing::info!("Starting graceful shutdown...");
        let disposed = self.application.dispose().await;
        match &disposed {
            Ok(()) => tracing::info!("Graceful shutdown complete"),
            Err(e) => tracing::error!("Error during shutdown: {}", e),
        }

        signal.and(disposed)
    }
}

/// Complete when Ctrl+C or SIGTERM is received.
///
/// # Example
///
/// ```rust,ignore
/// use wiring::shutdown_signal;
///
/// tokio::select! {
///     _ = shutdown_signal() => {
///         println!("Shutdown signal received");
///     }
///     _ = server.serve() => {}
/// }
/// ```
pub async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .map_err(|e| LifecycleError::Signal(format!("Ctrl+C handler: {e}")))
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(|e| LifecycleError::Signal(format!("SIGTERM handler: {e}")))?
            .recv()
            .await;
        Ok::<(), LifecycleError>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        received = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
            received
        },
        received = terminate => {
            tracing::info!("Received SIGTERM signal");
            received
        },
    }
}
