use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::{Model, RecordStore, Repository};
use crate::uploads::ImageStore;

/// Shared handles passed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub store: Arc<dyn RecordStore>,
    pub images: ImageStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            tokens: TokenService::new(&config.security),
            images: ImageStore::new(&config.uploads),
            config: Arc::new(config),
            store,
        }
    }

    pub fn repo<T: Model>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }
}
