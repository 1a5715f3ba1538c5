use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;
use tracing::instrument;

use crate::application::ports::{MetadataStore, RepositoryError};
use crate::domain::{Tag, Video, VideoId};

/// SQLite-backed metadata store: one row per video, one row per
/// (tag, video) association. Insert-and-read only by design.
pub struct SqliteMetadataStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct VideoRow {
    id: String,
    title: String,
    transcript: String,
    timestamp: String,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            id: VideoId::new(row.id),
            title: row.title,
            transcript: row.transcript,
            timestamp: row.timestamp,
        }
    }
}

impl SqliteMetadataStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_query_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::ConstraintViolation(db.to_string())
        }
        _ => RepositoryError::QueryFailed(e.to_string()),
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    #[instrument(skip(self, video), fields(video_id = %video.id))]
    async fn insert_video(&self, video: &Video) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO videos (id, title, transcript, timestamp) VALUES (?1, ?2, ?3, ?4)")
            .bind(video.id.as_str())
            .bind(&video.title)
            .bind(&video.transcript)
            .bind(&video.timestamp)
            .execute(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(tag = %tag, video_id = %video_id))]
    async fn insert_tag(&self, tag: &Tag, video_id: &VideoId) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO tags (tag, video_id) VALUES (?1, ?2)")
            .bind(tag.as_str())
            .bind(video_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn distinct_tags(&self) -> Result<Vec<String>, RepositoryError> {
        sqlx::query_scalar::<_, String>("SELECT DISTINCT tag FROM tags ORDER BY tag")
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)
    }

    #[instrument(skip(self), fields(video_id = %id))]
    async fn video_by_id(&self, id: &VideoId) -> Result<Option<Video>, RepositoryError> {
        let row = sqlx::query_as::<_, VideoRow>(
            "SELECT id, title, transcript, timestamp FROM videos WHERE id = ?1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_query_error)?;

        Ok(row.map(Video::from))
    }

    #[instrument(skip(self), fields(video_id = %id))]
    async fn tags_for_video(&self, id: &VideoId) -> Result<Vec<Tag>, RepositoryError> {
        let rows =
            sqlx::query_scalar::<_, String>("SELECT tag FROM tags WHERE video_id = ?1 ORDER BY id")
                .bind(id.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(map_query_error)?;

        Ok(rows.iter().filter_map(|t| Tag::new(t)).collect())
    }

    #[instrument(skip(self))]
    async fn videos_by_tag(&self, tag: &str) -> Result<Vec<Video>, RepositoryError> {
        let rows = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT DISTINCT v.id, v.title, v.transcript, v.timestamp
            FROM videos v
            JOIN tags t ON t.video_id = v.id
            WHERE t.tag = ?1
            ORDER BY v.id
            "#,
        )
        .bind(tag)
        .fetch_all(&self.pool)
        .await
        .map_err(map_query_error)?;

        Ok(rows.into_iter().map(Video::from).collect())
    }
}
