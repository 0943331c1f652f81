//! Accept loop and per-connection HTTP serving.

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder;
use hyper_util::service::TowerToHyperService;
use std::io;
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;

use super::listener::{BoxedStream, Listener};
use crate::error::LinkerError;

/// How long in-flight connections get to finish once shutdown starts.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const MAX_ACCEPT_BACKOFF: Duration = Duration::from_secs(1);

/// Per-connection settings shared by every accepted stream.
#[derive(Clone)]
pub struct ConnectionSettings {
    pub router: Router,
    pub tls: Option<TlsAcceptor>,
    pub timeout: Option<Duration>,
}

/// Accepts connections until `cancel` fires, then drains them.
///
/// Each connection runs in its own task; a panicking connection is logged
/// and does not stop the loop.
///
/// # Errors
///
/// Returns [`LinkerError::ShutdownTimeout`] if connections are still open
/// after [`SHUTDOWN_GRACE`]; they are aborted.
pub async fn serve(
    listener: Listener,
    settings: ConnectionSettings,
    cancel: CancellationToken,
) -> Result<(), LinkerError> {
    let mut connections = JoinSet::new();
    let mut backoff = Duration::ZERO;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    backoff = Duration::ZERO;
                    connections.spawn(serve_connection(stream, peer, settings.clone(), cancel.clone()));
                }
                Err(e) if is_connection_error(&e) => {
                    tracing::debug!(error = %e, "Connection dropped before accept");
                }
                Err(e) => {
                    backoff = (backoff * 2).clamp(Duration::from_millis(5), MAX_ACCEPT_BACKOFF);
                    tracing::error!(error = %e, retry_in = ?backoff, "Accept failed");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            },
            Some(joined) = connections.join_next() => observe(joined),
        }
    }

    drop(listener);
    drain(connections).await
}

async fn drain(mut connections: JoinSet<()>) -> Result<(), LinkerError> {
    if connections.is_empty() {
        return Ok(());
    }

    tracing::debug!(open = connections.len(), "Draining connections");
    let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
        while let Some(joined) = connections.join_next().await {
            observe(joined);
        }
    })
    .await;

    if drained.is_err() {
        tracing::warn!(
            open = connections.len(),
            "Connections still open after grace period, aborting"
        );
        connections.shutdown().await;
        return Err(LinkerError::ShutdownTimeout(SHUTDOWN_GRACE));
    }

    Ok(())
}

fn observe(joined: Result<(), JoinError>) {
    if let Err(e) = joined
        && e.is_panic()
    {
        tracing::error!(error = %e, "Connection task panicked");
    }
}

fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
    )
}

async fn serve_connection(
    stream: BoxedStream,
    peer: String,
    settings: ConnectionSettings,
    cancel: CancellationToken,
) {
    let stream = match settings.tls {
        Some(acceptor) => match handshake(acceptor, stream, settings.timeout).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::debug!(%peer, error = %e, "TLS handshake failed");
                return;
            }
        },
        None => stream,
    };

    let mut builder = Builder::new(TokioExecutor::new());
    builder.http1().timer(TokioTimer::new());
    builder.http2().timer(TokioTimer::new());
    if let Some(timeout) = settings.timeout {
        builder.http1().header_read_timeout(timeout);
    }

    let service = TowerToHyperService::new(settings.router);
    let connection = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    let result = tokio::select! {
        result = connection.as_mut() => result,
        _ = cancel.cancelled() => {
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    };

    if let Err(e) = result {
        tracing::debug!(%peer, error = %e, "Connection closed with error");
    }
}

async fn handshake(
    acceptor: TlsAcceptor,
    stream: BoxedStream,
    timeout: Option<Duration>,
) -> io::Result<BoxedStream> {
    let accept = acceptor.accept(stream);
    let tls = match timeout {
        Some(timeout) => tokio::time::timeout(timeout, accept)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "handshake timed out"))??,
        None => accept.await?,
    };
    Ok(Box::new(tls))
}
