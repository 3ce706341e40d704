pub mod credentials;

use std::sync::Arc;

use crate::{config::AppConfig, dao::admin_store::AdminStore};

use self::credentials::CredentialRegistry;

pub type SharedState = Arc<AppState>;

/// Central application state holding the configuration, credentials and store handle.
pub struct AppState {
    store: Arc<dyn AdminStore>,
    config: AppConfig,
    credentials: CredentialRegistry,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, store: Arc<dyn AdminStore>) -> SharedState {
        let credentials = CredentialRegistry::from_config(config.credentials());
        Arc::new(Self {
            store,
            config,
            credentials,
        })
    }

    /// Handle to the admin store.
    pub fn store(&self) -> Arc<dyn AdminStore> {
        self.store.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Known API tokens.
    pub fn credentials(&self) -> &CredentialRegistry {
        &self.credentials
    }
}
