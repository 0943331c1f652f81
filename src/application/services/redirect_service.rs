//! Short-name resolution.

use std::sync::Arc;

use crate::application::services::lookup::PreparedLookup;
use crate::domain::entities::RequestOutcome;

/// Query string that marks a Go toolchain import-path discovery request.
pub const VANITY_QUERY: &str = "go-get=1";

/// Resolves short names to redirect targets for the HTTP handler.
pub struct RedirectService {
    lookup: Arc<PreparedLookup>,
    default_url: String,
}

impl RedirectService {
    pub fn new(lookup: Arc<PreparedLookup>, default_url: impl Into<String>) -> Self {
        Self {
            lookup,
            default_url: default_url.into(),
        }
    }

    /// The configured fallback target.
    pub fn default_url(&self) -> &str {
        &self.default_url
    }

    /// Resolves `name` and decides what the handler answers with.
    ///
    /// `remainder` is appended verbatim to a resolved URL. When `vanity` is
    /// set, the stored URL is reported as a repository instead.
    ///
    /// # Outcomes
    ///
    /// - Store error or shutdown: [`RequestOutcome::InternalError`]
    /// - Unknown name or empty URL: [`RequestOutcome::NotFound`]
    /// - Discovery request: [`RequestOutcome::VanityImport`]
    /// - Otherwise: [`RequestOutcome::Resolved`] with `url + remainder`
    pub async fn resolve(&self, name: &str, remainder: &str, vanity: bool) -> RequestOutcome {
        let url = match self.lookup.find(name).await {
            Ok(Some(url)) if !url.is_empty() => url,
            Ok(_) => {
                tracing::debug!(name, "Short name not found");
                return RequestOutcome::NotFound;
            }
            Err(e) if self.lookup.is_cancelled() => {
                tracing::debug!(name, error = %e, "Lookup aborted by shutdown");
                return RequestOutcome::InternalError {
                    name: name.to_string(),
                };
            }
            Err(e) => {
                tracing::error!(name, error = %e, "Lookup failed");
                return RequestOutcome::InternalError {
                    name: name.to_string(),
                };
            }
        };

        if vanity {
            return RequestOutcome::VanityImport { repository: url };
        }

        RequestOutcome::Resolved(format!("{url}{remainder}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::error::StoreError;
    use tokio_util::sync::CancellationToken;

    async fn service(mut mock: MockLinkRepository) -> RedirectService {
        mock.expect_prepare_lookup().returning(|| Ok(()));
        let lookup = PreparedLookup::prepare(Arc::new(mock), CancellationToken::new())
            .await
            .unwrap();
        RedirectService::new(Arc::new(lookup), "https://default.test")
    }

    #[tokio::test]
    async fn test_resolve_appends_remainder() {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_url()
            .withf(|name| name == "foo")
            .returning(|_| Ok(Some("https://bar.test".to_string())));

        let outcome = service(mock).await.resolve("foo", "/x/y?z=1", false).await;

        assert_eq!(
            outcome,
            RequestOutcome::Resolved("https://bar.test/x/y?z=1".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_name() {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_url().returning(|_| Ok(None));

        let outcome = service(mock).await.resolve("missing", "", false).await;
        assert_eq!(outcome, RequestOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_empty_url_is_not_found() {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_url().returning(|_| Ok(Some(String::new())));

        let outcome = service(mock).await.resolve("blank", "", false).await;
        assert!(outcome.is_default_redirect());
    }

    #[tokio::test]
    async fn test_resolve_vanity() {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_url()
            .returning(|_| Ok(Some("https://git.test/tool".to_string())));

        let outcome = service(mock).await.resolve("tool", "?go-get=1", true).await;

        assert_eq!(
            outcome,
            RequestOutcome::VanityImport {
                repository: "https://git.test/tool".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_store_error() {
        let mut mock = MockLinkRepository::new();
        mock.expect_find_url()
            .returning(|_| Err(StoreError::Unavailable("connection reset".to_string())));

        let outcome = service(mock).await.resolve("foo", "", false).await;

        assert_eq!(
            outcome,
            RequestOutcome::InternalError {
                name: "foo".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_after_shutdown_skips_store() {
        let mut mock = MockLinkRepository::new();
        mock.expect_prepare_lookup().returning(|| Ok(()));
        mock.expect_find_url().times(0);

        let cancel = CancellationToken::new();
        let lookup = PreparedLookup::prepare(Arc::new(mock), cancel.clone())
            .await
            .unwrap();
        let service = RedirectService::new(Arc::new(lookup), "https://default.test");
        cancel.cancel();

        let outcome = service.resolve("foo", "/x", false).await;

        assert_eq!(
            outcome,
            RequestOutcome::InternalError {
                name: "foo".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_default_url() {
        let service = service(MockLinkRepository::new()).await;
        assert_eq!(service.default_url(), "https://default.test");
    }
}
