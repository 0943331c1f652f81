//! Router configuration.
//!
//! # Route Structure
//!
//! Every path is a candidate short name, so the redirect handler is mounted
//! as the fallback and no other route exists.
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Panic recovery** - Handler panics become 500 responses
//! - **Timeout** - Per-request deadline, when configured

use crate::api::handlers::redirect_handler;
use crate::api::middleware::{recover, tracing};
use crate::state::AppState;
use axum::Router;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;

/// Constructs the application router.
///
/// # Arguments
///
/// - `state` - shared state for the current listen session
/// - `timeout` - per-request deadline; `None` disables it
#[allow(deprecated)]
pub fn app_router(state: AppState, timeout: Option<Duration>) -> Router {
    let router = Router::new().fallback(redirect_handler).with_state(state);

    let router = match timeout {
        Some(timeout) => router.layer(TimeoutLayer::new(timeout)),
        None => router,
    };

    router.layer(
        ServiceBuilder::new()
            .layer(tracing::layer())
            .layer(CatchPanicLayer::custom(recover::handle_panic)),
    )
}
