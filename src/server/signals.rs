//! Termination signal handling.

use crate::error::LinkerError;

/// Registered interrupt, terminate and quit handlers for one listen session.
///
/// Dropping the value stops delivery to this session.
pub struct TerminationSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    quit: tokio::signal::unix::Signal,
}

impl TerminationSignals {
    #[cfg(unix)]
    pub fn register() -> Result<Self, LinkerError> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt()).map_err(LinkerError::Signal)?,
            terminate: signal(SignalKind::terminate()).map_err(LinkerError::Signal)?,
            quit: signal(SignalKind::quit()).map_err(LinkerError::Signal)?,
        })
    }

    #[cfg(not(unix))]
    pub fn register() -> Result<Self, LinkerError> {
        Ok(Self {})
    }

    /// Waits for the next signal and returns its name.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
            _ = self.quit.recv() => "SIGQUIT",
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> &'static str {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        "Ctrl-C"
    }
}
