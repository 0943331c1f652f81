//! Helpers for request path and URL handling.
//!
//! - [`short_name`] - Short-name validation and request path classification
//! - [`url_normalizer`] - Redirect target normalization

pub mod short_name;
pub mod url_normalizer;
