use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::users::{
    memory::InMemoryUserStore,
    repo::{PgUserStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let store = if config.database_url.starts_with("memory:") {
            info!("using in-memory user store");
            Arc::new(InMemoryUserStore::new()) as Arc<dyn UserStore>
        } else {
            let pg = PgUserStore::connect(&config.database_url)
                .await
                .context("connect to database")?;
            Arc::new(pg) as Arc<dyn UserStore>
        };

        Ok(Self::from_parts(store, Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        let jwt = JwtKeys::new(&config.jwt);
        Self { store, config, jwt }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_store().0
    }

    #[cfg(test)]
    pub fn fake_with_store() -> (Self, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::new());
        let config = Arc::new(AppConfig {
            database_url: "memory://".into(),
            host: "127.0.0.1".into(),
            port: 0,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                ttl_minutes: 5,
                leeway_seconds: 0,
            },
        });
        let state = Self::from_parts(store.clone() as Arc<dyn UserStore>, config);
        (state, store)
    }
}
