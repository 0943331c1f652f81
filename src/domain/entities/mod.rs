//! Core domain entities.
//!
//! - [`Mapping`] - a short name bound to its redirect target
//! - [`RequestOutcome`] - per-request resolution result

pub mod mapping;
pub mod outcome;

pub use mapping::Mapping;
pub use outcome::RequestOutcome;
