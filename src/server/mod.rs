//! Redirect engine lifecycle.
//!
//! A [`Linker`] moves through
//! `Configured -> Starting -> Listening -> Draining -> Closed`.
//! It can listen at most once; after [`Linker::close`] it is unusable.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = Config::load(None)?;
//! let linker = Linker::connect(config).await?;
//! linker.listen().await?; // blocks until a signal or close()
//! ```

mod accept;
mod listener;
mod signals;
mod tls;

pub use accept::SHUTDOWN_GRACE;
pub use listener::ListenAddr;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::services::{LinkService, PreparedLookup, RedirectService};
use crate::config::Config;
use crate::domain::entities::Mapping;
use crate::domain::repositories::LinkRepository;
use crate::error::LinkerError;
use crate::infrastructure::persistence::PgLinkRepository;
use crate::routes::app_router;
use crate::state::AppState;
use accept::ConnectionSettings;
use listener::Listener;
use signals::TerminationSignals;

/// Observable lifecycle state of a [`Linker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkerState {
    Configured,
    Starting,
    Listening,
    Draining,
    Closed,
}

enum Phase {
    Configured,
    /// `start()` is running outside the lock.
    Starting,
    Listening(Session),
    Draining,
    Closed,
}

/// Resources owned by one listen session.
struct Session {
    cancel: CancellationToken,
    accept: JoinHandle<Result<(), LinkerError>>,
    lookup: Arc<PreparedLookup>,
    local_addr: Option<SocketAddr>,
    socket_path: Option<PathBuf>,
}

impl Session {
    /// Stops accepting, waits for in-flight requests and releases the lookup.
    async fn drain(self) -> Result<(), LinkerError> {
        self.cancel.cancel();

        let result = match self.accept.await {
            Ok(result) => result,
            Err(e) => Err(LinkerError::AcceptLoop(e.to_string())),
        };

        drop(self.lookup);

        if let Some(path) = self.socket_path
            && let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove socket file");
        }

        result
    }
}

/// The short-name redirector: configuration, store handle and listener.
pub struct Linker {
    listen_addr: ListenAddr,
    tls_paths: Option<(PathBuf, PathBuf)>,
    timeout: Option<Duration>,
    default_url: String,
    repository: Arc<dyn LinkRepository>,
    links: LinkService,
    phase: Mutex<Phase>,
    closed: watch::Sender<bool>,
}

impl Linker {
    /// Connects to PostgreSQL and creates the mapping table if missing.
    ///
    /// # Errors
    ///
    /// Returns [`LinkerError::Store`] if the server is unreachable or the
    /// schema cannot be created. The pool is closed before returning.
    pub async fn connect(config: Config) -> Result<Self, LinkerError> {
        let repository = PgLinkRepository::connect(&config.database).await?;

        if let Err(e) = repository.ensure_schema().await {
            repository.close().await;
            return Err(e.into());
        }

        tracing::info!("Connected to database");
        Self::with_repository(config, Arc::new(repository))
    }

    /// Builds a linker over an already connected store.
    ///
    /// # Errors
    ///
    /// Returns [`LinkerError::Config`] if the default redirect is invalid.
    pub fn with_repository(
        config: Config,
        repository: Arc<dyn LinkRepository>,
    ) -> Result<Self, LinkerError> {
        let default_url = config.default_redirect()?;
        let (closed, _) = watch::channel(false);

        Ok(Self {
            listen_addr: ListenAddr::parse(&config.listen),
            tls_paths: config.tls_paths(),
            timeout: config.request_timeout(),
            default_url,
            links: LinkService::new(repository.clone()),
            repository,
            phase: Mutex::new(Phase::Configured),
            closed,
        })
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> LinkerState {
        match &*self.phase.lock().await {
            Phase::Configured => LinkerState::Configured,
            Phase::Starting => LinkerState::Starting,
            Phase::Listening(_) => LinkerState::Listening,
            Phase::Draining => LinkerState::Draining,
            Phase::Closed => LinkerState::Closed,
        }
    }

    /// Bound TCP address while listening; `None` otherwise or for Unix sockets.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.phase.lock().await {
            Phase::Listening(session) => session.local_addr,
            _ => None,
        }
    }

    /// The configured fallback redirect target.
    pub fn default_url(&self) -> &str {
        &self.default_url
    }

    /// Serves redirects until a termination signal arrives or [`close`] is
    /// called, then shuts down.
    ///
    /// Returns immediately with `Ok(())` if already starting or listening.
    ///
    /// # Errors
    ///
    /// - [`LinkerError::Closed`] if the linker was closed
    /// - Startup failures (signal registration, prepare, TLS, bind) are
    ///   returned before serving; the linker goes back to `Configured`
    /// - Shutdown failures are returned from the final close
    ///
    /// A [`close`] that arrives while starting makes this call tear the
    /// fresh session down and finish the close itself.
    ///
    /// [`close`]: Linker::close
    pub async fn listen(&self) -> Result<(), LinkerError> {
        {
            let mut phase = self.phase.lock().await;
            match &*phase {
                Phase::Closed => return Err(LinkerError::Closed),
                Phase::Starting | Phase::Listening(_) | Phase::Draining => return Ok(()),
                Phase::Configured => *phase = Phase::Starting,
            }
        }

        let started = self.start().await;

        let mut phase = self.phase.lock().await;
        let close_requested = matches!(*phase, Phase::Draining);
        let (cancel, mut signals) = match started {
            Ok((session, signals)) if !close_requested => {
                let cancel = session.cancel.clone();
                *phase = Phase::Listening(session);
                (cancel, signals)
            }
            Ok((session, _signals)) => {
                drop(phase);
                let result = session.drain().await;
                return self.finish_close(result).await;
            }
            Err(e) if !close_requested => {
                *phase = Phase::Configured;
                return Err(e);
            }
            Err(e) => {
                drop(phase);
                tracing::debug!(error = %e, "Startup failed while closing");
                return self.finish_close(Ok(())).await;
            }
        };
        drop(phase);

        tokio::select! {
            signal = signals.recv() => tracing::info!(signal, "Received termination signal"),
            _ = cancel.cancelled() => tracing::debug!("Listen session cancelled"),
        }
        drop(signals);

        self.close().await
    }

    async fn start(&self) -> Result<(Session, TerminationSignals), LinkerError> {
        let signals = TerminationSignals::register()?;
        let cancel = CancellationToken::new();
        let lookup = Arc::new(PreparedLookup::prepare(self.repository.clone(), cancel.clone()).await?);

        let tls = match &self.tls_paths {
            Some((key, cert)) => Some(tls::acceptor(key, cert)?),
            None => None,
        };

        let listener = Listener::bind(&self.listen_addr).await?;
        let local_addr = listener.local_addr();

        tracing::info!(
            address = %self.listen_addr,
            tls = tls.is_some(),
            "Linker listening"
        );

        let redirect = RedirectService::new(lookup.clone(), self.default_url.clone());
        let settings = ConnectionSettings {
            router: app_router(AppState::new(Arc::new(redirect)), self.timeout),
            tls,
            timeout: self.timeout,
        };

        let accept = tokio::spawn(accept::serve(listener, settings, cancel.clone()));

        Ok((
            Session {
                cancel,
                accept,
                lookup,
                local_addr,
                socket_path: self.listen_addr.socket_path().map(Path::to_path_buf),
            },
            signals,
        ))
    }

    /// Stops the listener (if any), waits up to [`SHUTDOWN_GRACE`] for
    /// in-flight requests and closes the store.
    ///
    /// Idempotent: later calls, and calls racing a shutdown in progress,
    /// return `Ok(())` once the linker is closed. Called while starting,
    /// it waits for the starting [`listen`] to tear the session down.
    ///
    /// [`listen`]: Linker::listen
    pub async fn close(&self) -> Result<(), LinkerError> {
        let previous = {
            let mut phase = self.phase.lock().await;
            match std::mem::replace(&mut *phase, Phase::Draining) {
                Phase::Closed => {
                    *phase = Phase::Closed;
                    return Ok(());
                }
                Phase::Starting | Phase::Draining => None,
                other => Some(other),
            }
        };

        let Some(previous) = previous else {
            let mut closed = self.closed.subscribe();
            let _ = closed.wait_for(|closed| *closed).await;
            return Ok(());
        };

        let result = match previous {
            Phase::Listening(session) => session.drain().await,
            _ => Ok(()),
        };

        self.finish_close(result).await
    }

    async fn finish_close(&self, result: Result<(), LinkerError>) -> Result<(), LinkerError> {
        self.repository.close().await;
        *self.phase.lock().await = Phase::Closed;
        self.closed.send_replace(true);

        match &result {
            Ok(()) => tracing::info!("Linker closed"),
            Err(e) => tracing::error!(error = %e, "Linker closed with error"),
        }
        result
    }

    fn ensure_open(&self) -> Result<(), LinkerError> {
        if *self.closed.borrow() {
            return Err(LinkerError::Closed);
        }
        Ok(())
    }

    /// Adds a mapping. See [`LinkService::add`].
    pub async fn add(&self, name: &str, url: &str) -> Result<Mapping, LinkerError> {
        self.ensure_open()?;
        self.links.add(name, url).await
    }

    /// Removes a mapping; succeeds if it does not exist.
    pub async fn delete(&self, name: &str) -> Result<bool, LinkerError> {
        self.ensure_open()?;
        self.links.delete(name).await
    }

    /// Lists every mapping ordered by name.
    pub async fn list(&self) -> Result<Vec<Mapping>, LinkerError> {
        self.ensure_open()?;
        self.links.list().await
    }
}
