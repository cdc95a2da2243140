use std::sync::Arc;
use crate::config::Config;
use crate::error::Result;
use crate::repositories::{
    restaurant::{PgRestaurantRepository, RestaurantRepository},
    user::{PgUserRepository, UserRepository},
};
use crate::services::uploads::UploadStore;
use crate::sessions::{
    memory_store::MemorySessionStore,
    redis_store::RedisSessionStore,
    store::SessionStore,
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// Access to user rows.
    pub users: Arc<dyn UserRepository>,
    /// Access to restaurant rows.
    pub restaurants: Arc<dyn RestaurantRepository>,
    /// Where sessions live.
    pub sessions: Arc<dyn SessionStore>,
    /// Where profile photos are written.
    pub uploads: UploadStore,
    /// The application's configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Connects every backing service described by `config`.
    ///
    /// The database is probed before returning, so a dead store stops startup.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        crate::db::ping(&db).await?;
        tracing::info!("✅ PostgreSQL pool initialized and reachable");

        let sessions: Arc<dyn SessionStore> = match &config.redis_url {
            Some(url) => {
                let store = RedisSessionStore::connect(url).await?;
                tracing::info!("✅ Redis session store initialized");
                Arc::new(store)
            }
            None => {
                tracing::info!("✅ In-memory session store initialized (REDIS_URL not set)");
                Arc::new(MemorySessionStore::new())
            }
        };

        let uploads = UploadStore::new(config.upload_dir.clone(), config.upload_max_bytes);
        uploads.ensure_dir().await?;
        tracing::info!("✅ Upload directory ready: {}", config.upload_dir.display());

        Ok(Self::from_parts(
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgRestaurantRepository::new(db)),
            sessions,
            uploads,
            config.clone(),
        ))
    }

    /// Assembles state from already-built parts.
    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        restaurants: Arc<dyn RestaurantRepository>,
        sessions: Arc<dyn SessionStore>,
        uploads: UploadStore,
        config: Config,
    ) -> Self {
        AppState {
            users,
            restaurants,
            sessions,
            uploads,
            config: Arc::new(config),
        }
    }
}
