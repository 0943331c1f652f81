//! Application layer services.
//!
//! Services consume repository traits and provide the operations used by the
//! HTTP handler and the command line.
//!
//! - [`services::link_service::LinkService`] - Validated mapping management
//! - [`services::lookup::PreparedLookup`] - Lookup bound to the run context
//! - [`services::redirect_service::RedirectService`] - Short-name resolution

pub mod services;
