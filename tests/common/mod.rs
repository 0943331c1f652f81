#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use linker::application::services::{PreparedLookup, RedirectService};
use linker::config::Config;
use linker::domain::entities::Mapping;
use linker::domain::repositories::LinkRepository;
use linker::error::StoreError;
use linker::routes::app_router;
use linker::state::AppState;
use linker::{Linker, LinkerState};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Lookups of this name never complete until cancelled.
pub const SLOW_NAME: &str = "slow";
/// Lookups of this name panic inside the store.
pub const PANIC_NAME: &str = "explode";

pub const DEFAULT_URL: &str = "https://default.test";

/// In-memory mapping store with switches for failure scenarios.
#[derive(Default)]
pub struct MemoryRepository {
    links: Mutex<BTreeMap<String, String>>,
    failing: AtomicBool,
    failing_prepare: AtomicBool,
    holding_prepare: AtomicBool,
    prepare_started: Notify,
    prepare_released: Notify,
    closed: AtomicBool,
    slow_started: Notify,
    slow_cancelled: Arc<AtomicBool>,
}

impl MemoryRepository {
    pub fn with_links(links: &[(&str, &str)]) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut map = repo.links.lock().unwrap();
            for (name, url) in links {
                map.insert(name.to_string(), url.to_string());
            }
        }
        Arc::new(repo)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fail_prepare(&self) {
        self.failing_prepare.store(true, Ordering::SeqCst);
    }

    /// Makes the next prepare wait for [`release_prepare`](Self::release_prepare).
    pub fn hold_prepare(&self) {
        self.holding_prepare.store(true, Ordering::SeqCst);
    }

    /// Resolves once a held prepare is waiting.
    pub async fn prepare_started(&self) {
        self.prepare_started.notified().await;
    }

    pub fn release_prepare(&self) {
        self.prepare_released.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn slow_cancelled(&self) -> bool {
        self.slow_cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once a lookup of [`SLOW_NAME`] is in flight.
    pub async fn slow_started(&self) {
        self.slow_started.notified().await;
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }
}

/// Flags the slow lookup as cancelled when its future is dropped.
struct CancelGuard(Arc<AtomicBool>);

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LinkRepository for MemoryRepository {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }

    async fn prepare_lookup(&self) -> Result<(), StoreError> {
        if self.holding_prepare.swap(false, Ordering::SeqCst) {
            self.prepare_started.notify_one();
            self.prepare_released.notified().await;
        }
        if self.failing_prepare.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("prepare failed".to_string()));
        }
        self.check()
    }

    async fn find_url(&self, name: &str) -> Result<Option<String>, StoreError> {
        self.check()?;

        if name == PANIC_NAME {
            panic!("store exploded");
        }

        if name == SLOW_NAME {
            let _guard = CancelGuard(self.slow_cancelled.clone());
            self.slow_started.notify_one();
            std::future::pending::<()>().await;
        }

        Ok(self.links.lock().unwrap().get(name).cloned())
    }

    async fn insert(&self, name: &str, url: &str) -> Result<(), StoreError> {
        self.check()?;
        let mut links = self.links.lock().unwrap();
        if links.contains_key(name) {
            return Err(StoreError::Conflict {
                name: name.to_string(),
            });
        }
        links.insert(name.to_string(), url.to_string());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.links.lock().unwrap().remove(name).is_some())
    }

    async fn list(&self) -> Result<Vec<Mapping>, StoreError> {
        self.check()?;
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .map(|(name, url)| Mapping::new(name.as_str(), url.as_str()))
            .collect())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A configuration that listens on `listen` and redirects to [`DEFAULT_URL`].
pub fn test_config(listen: &str) -> Config {
    test_config_with_timeout(listen, 5)
}

/// Like [`test_config`] with a request timeout in seconds; `0` disables it.
pub fn test_config_with_timeout(listen: &str, timeout: u8) -> Config {
    let raw = format!(
        r#"{{
            "listen": "{listen}",
            "timeout": {timeout},
            "default": "{DEFAULT_URL}",
            "db": {{ "name": "linker", "server": "localhost:5432", "username": "linker_user" }}
        }}"#
    );
    Config::from_json(&raw, Path::new("test.conf")).unwrap()
}

/// Router over `repo`, as served by a listening linker.
pub async fn create_test_router(repo: Arc<MemoryRepository>) -> Router {
    let lookup = PreparedLookup::prepare(repo, CancellationToken::new())
        .await
        .unwrap();
    let redirect = RedirectService::new(Arc::new(lookup), DEFAULT_URL);
    app_router(
        AppState::new(Arc::new(redirect)),
        Some(Duration::from_secs(5)),
    )
}

pub fn create_test_linker(repo: Arc<MemoryRepository>, listen: &str) -> Arc<Linker> {
    Arc::new(Linker::with_repository(test_config(listen), repo).unwrap())
}

/// Waits until `linker` is listening and returns its TCP address, if any.
pub async fn wait_until_listening(linker: &Linker) -> Option<SocketAddr> {
    tokio::time::timeout(Duration::from_secs(5), async {
        while linker.state().await != LinkerState::Listening {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("linker did not start listening");

    linker.local_addr().await
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
