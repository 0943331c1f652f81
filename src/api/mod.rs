//! HTTP layer for the redirector.
//!
//! # Modules
//!
//! - [`handlers`] - The redirect handler
//! - [`middleware`] - Panic recovery and request tracing

pub mod handlers;
pub mod middleware;
