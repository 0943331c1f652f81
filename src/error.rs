//! Error types shared across the redirector.
//!
//! - [`ConfigError`] - configuration could not be loaded; fatal at startup
//! - [`StoreError`] - the mapping store failed or the query was cancelled
//! - [`LinkerError`] - top-level error returned by engine and CLI operations
//! - [`AppError`] - HTTP-facing error rendered as a plain-text response

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use std::time::Duration;

/// Failure to load or validate the JSON configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read \"{path}\": {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse \"{path}\": {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("file \"{path}\" does not contain a valid configuration: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("parse default URL \"{url}\": {reason}")]
    DefaultUrl { url: String, reason: String },
}

/// Failure reported by a [`crate::domain::repositories::LinkRepository`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{operation} error: {source}")]
    Database {
        operation: &'static str,
        source: sqlx::Error,
    },

    #[error("schema error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("mapping \"{name}\" already exists")]
    Conflict { name: String },

    #[error("query cancelled by shutdown")]
    Cancelled,

    #[error("{0}")]
    Unavailable(String),
}

impl StoreError {
    /// Wraps a driver error, tagging it with the operation that failed.
    pub fn database(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Database { operation, source }
    }
}

/// Errors returned by [`crate::server::Linker`] and the link management
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("name \"{0}\" contains invalid characters")]
    InvalidName(String),

    #[error("parse URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("listen on \"{address}\": {source}")]
    Listen {
        address: String,
        source: std::io::Error,
    },

    #[error("TLS setup error: {0}")]
    Tls(String),

    #[error("signal registration error: {0}")]
    Signal(std::io::Error),

    #[error("shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("accept loop failed: {0}")]
    AcceptLoop(String),

    #[error("linker is closed")]
    Closed,
}

/// Error raised while answering a single redirect request.
///
/// Never fatal to the listener: it is logged and rendered as a 500 response.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("could not fetch requested URL \"{name}\"")]
    Lookup { name: String },

    #[error("redirect target for \"{name}\" is not a valid header value")]
    InvalidTarget { name: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let name = match &self {
            AppError::Lookup { name } | AppError::InvalidTarget { name } => name,
        };
        let body = format!("Could not fetch requested URL \"{name}\"");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}
