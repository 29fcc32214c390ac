mod db;
mod errors;

pub mod analytics;
pub mod approvals;
pub mod audit;
pub mod auth;
pub mod orders;
pub mod refunds;
pub mod settings;

use std::{env, str::FromStr, time::Duration};

pub use db::SqliteDatabase;
pub use errors::SqliteDatabaseError;
use log::info;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Sqlite,
    SqlitePool,
};

const SQLITE_DB_URL: &str = "sqlite://data/retail_store.db";

pub fn db_url() -> String {
    let result = env::var("RPG_DATABASE_URL").unwrap_or_else(|_| {
        info!("RPG_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

/// WAL journaling plus a busy timeout so that concurrent financial transitions queue instead of erroring with
/// SQLITE_BUSY.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    let options = SqliteConnectOptions::from_str(url)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(10));
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

pub async fn create_database_if_missing(url: &str) -> Result<(), SqliteDatabaseError> {
    if !Sqlite::database_exists(url).await? {
        info!("Database {url} does not exist. Creating it.");
        Sqlite::create_database(url).await?;
    }
    Ok(())
}

/// Applies the embedded schema migrations. Safe to call on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteDatabaseError> {
    sqlx::migrate!("./src/db/sqlite/migrations").run(pool).await?;
    Ok(())
}
