//! Domain layer containing the mapping entity and the store contract.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependency on the HTTP or persistence layers; the
//! store contract is implemented in [`crate::infrastructure::persistence`].

pub mod entities;
pub mod repositories;
