use anyhow::Context;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const MAX_FILE_CONNECTIONS: u32 = 8;

/// In-memory SQLite databases live and die with a single connection
fn is_in_memory(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}

/// Opens a connection pool for the given SQLite URL, creating the database file and its
/// directory if they don't exist yet. In-memory databases get exactly one connection which
/// is never recycled, since every new connection would see an empty database.
pub async fn connect_sqlx(db_url: &str) -> Result<SqlitePool, anyhow::Error> {
    let connect_options = SqliteConnectOptions::from_str(db_url)
        .with_context(|| format!("Parsing database URL {db_url}"))?
        .create_if_missing(true);

    let pool_options = if is_in_memory(db_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        if let Some(parent) = connect_options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Creating database directory {}", parent.display())
                })?;
            }
        }

        SqlitePoolOptions::new()
            .max_connections(MAX_FILE_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(5))
    };

    let pool = pool_options
        .connect_with(connect_options)
        .await
        .context("Connecting to the database")?;
    info!("Connected to database");

    Ok(pool)
}

/// Brings the schema up to date with the migrations embedded at build time
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), anyhow::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Running database migrations")?;

    Ok(())
}
