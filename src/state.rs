use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::database::DataStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: DataStore,
    pub auth: AuthService,
}

impl AppState {
    /// Open the data directory, build the auth service and seed the admin account.
    pub async fn initialize(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let store = DataStore::open(&config.storage).await?;
        let auth = AuthService::new(store.users.clone(), config.security.clone())?;
        auth.seed_admin(&config.seed).await?;

        Ok(Self {
            config: Arc::new(config),
            store,
            auth,
        })
    }
}
