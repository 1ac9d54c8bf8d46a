use crate::config::AppConfig;
use crate::db;
use crate::users::{password::PasswordHasher, services::UserService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let hasher = PasswordHasher::new(config.hashing)?;
        let store = db::user_store(&config).await?;

        Ok(Self {
            config,
            users: UserService::new(store, hasher),
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::users::{memory::InMemoryUserStore, password::test_hasher};

        let config = Arc::new(AppConfig {
            database_url: None,
            db_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            hashing: Default::default(),
        });
        let users = UserService::new(Arc::new(InMemoryUserStore::new()), test_hasher());
        Self { config, users }
    }
}
