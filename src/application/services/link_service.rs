//! Mapping management: add, delete and list.

use std::sync::Arc;

use crate::domain::entities::Mapping;
use crate::domain::repositories::LinkRepository;
use crate::error::LinkerError;
use crate::utils::short_name::is_valid_name;
use crate::utils::url_normalizer::normalize_url;

/// Service for creating, removing and listing mappings.
///
/// Names are validated before the store is touched; URLs are normalized so
/// that every stored target carries a scheme.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(repository: Arc<dyn LinkRepository>) -> Self {
        Self { repository }
    }

    /// Adds a mapping from `name` to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkerError::InvalidName`] if the name uses characters outside
    /// `[0-9A-Za-z_-]`, [`LinkerError::InvalidUrl`] if the URL cannot be
    /// normalized, and [`LinkerError::Store`] if the insert fails.
    pub async fn add(&self, name: &str, url: &str) -> Result<Mapping, LinkerError> {
        if !is_valid_name(name) {
            return Err(LinkerError::InvalidName(name.to_string()));
        }

        let url = normalize_url(url).map_err(|e| LinkerError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        self.repository.insert(name, &url).await?;
        tracing::info!(name, url = %url, "Mapping added");

        Ok(Mapping::new(name, url))
    }

    /// Removes the mapping for `name`.
    ///
    /// Succeeds even if no such mapping exists; the returned flag reports
    /// whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`LinkerError::InvalidName`] before touching the store, or
    /// [`LinkerError::Store`] if the delete fails.
    pub async fn delete(&self, name: &str) -> Result<bool, LinkerError> {
        if !is_valid_name(name) {
            return Err(LinkerError::InvalidName(name.to_string()));
        }

        let removed = self.repository.delete(name).await?;
        tracing::info!(name, removed, "Mapping deleted");
        Ok(removed)
    }

    /// Lists every mapping ordered by name.
    pub async fn list(&self) -> Result<Vec<Mapping>, LinkerError> {
        Ok(self.repository.list().await?)
    }
}
