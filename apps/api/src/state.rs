use std::sync::Arc;

use crate::config::Config;
use crate::sessions::SessionRegistry;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ResumeStore>) -> Self {
        let sessions = Arc::new(SessionRegistry::new(store, config.autosave_debounce));
        Self { config, sessions }
    }
}
