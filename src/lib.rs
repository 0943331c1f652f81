//! # Linker
//!
//! A short-name HTTP redirector backed by PostgreSQL, built with Axum and
//! Hyper.
//!
//! Requests for `/{name}` are answered with a `307 Temporary Redirect` to the
//! URL stored for `name`, with any trailing path and query appended. Unknown
//! names and malformed paths go to a configured default URL. `GET
//! /{name}?go-get=1` returns a Go import-path discovery page instead.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Mapping entity and the store trait
//! - **Application Layer** ([`application`]) - Mapping management and resolution
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgreSQL store
//! - **API Layer** ([`api`]) - Redirect handler and middleware
//! - **Server** ([`server`]) - Listener lifecycle, TLS and signals
//!
//! ## Quick Start
//!
//! ```bash
//! linker defaults > /etc/linker.conf   # then edit the db section
//! linker add docs https://docs.example.com
//! linker serve
//! ```
//!
//! ## Configuration
//!
//! See [`config`] for the file format and lookup order.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::{AppError, LinkerError};
pub use server::{Linker, LinkerState};
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{LinkService, PreparedLookup, RedirectService};
    pub use crate::config::Config;
    pub use crate::domain::entities::{Mapping, RequestOutcome};
    pub use crate::domain::repositories::LinkRepository;
    pub use crate::error::{AppError, LinkerError, StoreError};
    pub use crate::server::{Linker, LinkerState};
    pub use crate::state::AppState;
}
