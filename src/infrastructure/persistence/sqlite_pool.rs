use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{info, instrument, warn};

use crate::application::ports::RepositoryError;

#[instrument(skip(url))]
pub async fn create_pool(url: &str, max_connections: u32) -> Result<SqlitePool, RepositoryError> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?
        .create_if_missing(true);

    let mut retries = 5;
    let mut delay = Duration::from_millis(500);

    loop {
        match SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => {
                info!("SQLite connection pool established");
                return Ok(pool);
            }
            Err(e) if retries > 0 => {
                retries -= 1;
                warn!(
                    error = %e,
                    retries_left = retries,
                    delay_ms = delay.as_millis(),
                    "SQLite connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => {
                return Err(RepositoryError::ConnectionFailed(e.to_string()));
            }
        }
    }
}

/// Create the videos and tags tables if they do not exist yet. Tags are one
/// row per (tag, video) association; tag text is not deduplicated as an
/// entity.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS videos (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            transcript TEXT NOT NULL,
            timestamp TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag TEXT NOT NULL,
            video_id TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tags_tag ON tags(tag)")
        .execute(pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tags_video_id ON tags(video_id)")
        .execute(pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    info!("SQLite migrations applied");
    Ok(())
}
