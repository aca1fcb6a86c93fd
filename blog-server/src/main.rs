use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use data::repositories::memory::MemoryStore;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::clock::SystemClock;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::{Settings, StorageBackend};
use presentation::{AppState, SharedPostRepository, SharedUserRepository};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level, settings.log_format)?;

    let (users, posts) = build_repositories(&settings).await?;
    let jwt = JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds);
    let state = AppState::new(users, posts, jwt, Arc::new(SystemClock));

    server::run_http(&settings, state).await
}

async fn build_repositories(
    settings: &Settings,
) -> Result<(SharedUserRepository, SharedPostRepository)> {
    match settings.storage {
        StorageBackend::Postgres => {
            let url = settings
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let pool = create_pool(url, settings.database_max_connections).await?;
            run_migrations(&pool).await?;

            info!("using postgres storage");
            Ok((
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresPostRepository::new(pool)),
            ))
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage, data is lost on restart");
            let store = MemoryStore::new();
            Ok((Arc::new(store.clone()), Arc::new(store)))
        }
    }
}
