use crate::auth::{
    jwt::JwtKeys,
    repo::{PgUserRepo, UserRepo},
};
use crate::checklists::repo::{ChecklistRepo, PgChecklistRepo};
use crate::config::AppConfig;
use crate::db;
use crate::storage::{LocalStorage, StorageClient};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserRepo>,
    pub checklists: Arc<dyn ChecklistRepo>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    /// Load config, connect, migrate and prepare the uploads dir. Any failure is fatal.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = db::connect(&config).await?;
        db::migrate(&db).await?;

        let storage = Arc::new(LocalStorage::new(&config.uploads_dir).await?)
            as Arc<dyn StorageClient>;

        Ok(Self {
            jwt: JwtKeys::new(&config.jwt),
            users: Arc::new(PgUserRepo::new(db.clone())),
            checklists: Arc::new(PgChecklistRepo::new(db.clone())),
            db,
            config,
            storage,
        })
    }

    pub async fn close(&self) {
        self.db.close().await;
        info!("database pool closed");
    }

    /// State backed by in-memory repositories. The pool is lazy and never used.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_storage(Arc::new(crate::memory::FakeStorage::default()))
    }

    #[cfg(test)]
    pub fn fake_with_storage(storage: Arc<dyn StorageClient>) -> Self {
        use crate::memory::{MemoryChecklistRepo, MemoryUserRepo};

        let config = AppConfig::for_tests();
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool ok");

        Self {
            db,
            jwt: JwtKeys::new(&config.jwt),
            config: Arc::new(config),
            users: Arc::new(MemoryUserRepo::default()),
            checklists: Arc::new(MemoryChecklistRepo::default()),
            storage,
        }
    }
}
