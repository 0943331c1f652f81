//! Panic recovery for request handlers.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::any::Any;

/// Converts a handler panic into a plain-text 500 response.
///
/// Used with `CatchPanicLayer::custom`; the connection and the listener keep
/// running.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Internal Server Error",
    )
        .into_response()
}
