//! Repository trait for the name to URL mapping store.

use crate::domain::entities::Mapping;
use crate::error::StoreError;
use async_trait::async_trait;

/// The persistent name to URL table and its query operations.
///
/// Implementations must be safe for concurrent use: one instance is shared by
/// every in-flight request.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates the mapping table when it does not exist yet.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Prepares the lookup query so that a broken statement fails at startup
    /// instead of on the first request.
    async fn prepare_lookup(&self) -> Result<(), StoreError>;

    /// Looks up the URL stored for `name`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` if found
    /// - `Ok(None)` if not found
    async fn find_url(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Inserts a new mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the name already exists.
    async fn insert(&self, name: &str, url: &str) -> Result<(), StoreError>;

    /// Deletes the mapping for `name`.
    ///
    /// Returns `Ok(true)` if a mapping was removed, `Ok(false)` if none existed.
    async fn delete(&self, name: &str) -> Result<bool, StoreError>;

    /// Lists every mapping ordered by name.
    async fn list(&self) -> Result<Vec<Mapping>, StoreError>;

    /// Releases the underlying connections. Later calls fail.
    async fn close(&self);
}
