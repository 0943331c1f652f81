//! PostgreSQL repository implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Mapping storage and lookup

pub mod pg_link_repository;

pub use pg_link_repository::PgLinkRepository;
