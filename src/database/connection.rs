use crate::config::{DatabaseConfig, RedisConfig};
use crate::error::AppResult;
use migration::{Migrator, MigratorTrait};
use redis::aio::ConnectionManager;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);

    let pool = Database::connect(options).await?;
    log::info!("Database connected");
    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}

/// Opens the redis client and verifies it answers a PING.
pub async fn create_cache(config: &RedisConfig) -> AppResult<ConnectionManager> {
    let client = redis::Client::open(config.url.as_str())?;
    let mut manager = ConnectionManager::new(client).await?;
    let _: String = redis::cmd("PING").query_async(&mut manager).await?;
    log::info!("Redis connected");
    Ok(manager)
}
