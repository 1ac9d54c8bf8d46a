use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::users::{memory::InMemoryUserStore, repo::PgUserStore, repo::UserStore};

pub async fn connect(config: &AppConfig, database_url: &str) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(database_url)
        .await
        .context("connect to database")?;
    Ok(db)
}

/// Picks the user store: postgres when `DATABASE_URL` is set, otherwise an
/// in-memory store that forgets everything on restart.
pub async fn user_store(config: &AppConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    let Some(url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set; using in-memory user store");
        return Ok(Arc::new(InMemoryUserStore::new()));
    };

    let db = connect(config, url).await?;
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;
    info!("connected to postgres");
    Ok(Arc::new(PgUserStore::new(db)))
}
