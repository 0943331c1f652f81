//! Lookup handle bound to a listen session's cancellation token.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::domain::repositories::LinkRepository;
use crate::error::StoreError;

/// The prepared lookup query of one listen session.
///
/// Created when the linker starts listening and dropped when it closes. Every
/// lookup races the session token, so cancelling the token aborts in-flight
/// queries.
pub struct PreparedLookup {
    repository: Arc<dyn LinkRepository>,
    cancel: CancellationToken,
}

impl PreparedLookup {
    /// Prepares the lookup statement.
    ///
    /// # Errors
    ///
    /// Returns the store error if preparation fails, or
    /// [`StoreError::Cancelled`] if the token is cancelled first.
    pub async fn prepare(
        repository: Arc<dyn LinkRepository>,
        cancel: CancellationToken,
    ) -> Result<Self, StoreError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Cancelled),
            prepared = repository.prepare_lookup() => prepared?,
        }

        Ok(Self { repository, cancel })
    }

    /// Looks up the URL for `name`, aborting if the session is cancelled.
    pub async fn find(&self, name: &str) -> Result<Option<String>, StoreError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StoreError::Cancelled),
            found = self.repository.find_url(name) => found,
        }
    }

    /// Returns true once the owning session has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PreparedLookup {
    fn drop(&mut self) {
        tracing::debug!("Prepared lookup released");
    }
}
