//! Shared state injected into the redirect handler.

use std::sync::Arc;

use crate::application::services::RedirectService;

/// State shared by every request of one listen session.
#[derive(Clone)]
pub struct AppState {
    pub redirect: Arc<RedirectService>,
}

impl AppState {
    pub fn new(redirect: Arc<RedirectService>) -> Self {
        Self { redirect }
    }
}
