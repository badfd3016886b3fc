use crate::config::AppConfig;
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        Ok(Self { db, config })
    }

    /// State backed by a lazily connecting pool; nothing touches the network
    /// until a query runs. Needs a running tokio runtime.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig::for_tests());
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool ok");
        Self { db, config }
    }

    /// State over a pool handed out by `#[sqlx::test]`.
    #[cfg(test)]
    pub fn with_pool(db: PgPool) -> Self {
        Self {
            db,
            config: Arc::new(AppConfig::for_tests()),
        }
    }
}
