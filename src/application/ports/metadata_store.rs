use async_trait::async_trait;

use crate::domain::{Tag, Video, VideoId};

/// Relational persistence for video records and tag associations.
///
/// Deliberately insert-and-read only: videos are immutable after ingestion
/// and no delete path exists in this design.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn insert_video(&self, video: &Video) -> Result<(), RepositoryError>;

    async fn insert_tag(&self, tag: &Tag, video_id: &VideoId) -> Result<(), RepositoryError>;

    /// The distinct set of tag strings across all videos, used to bias new
    /// tag generation toward reuse.
    async fn distinct_tags(&self) -> Result<Vec<String>, RepositoryError>;

    async fn video_by_id(&self, id: &VideoId) -> Result<Option<Video>, RepositoryError>;

    async fn tags_for_video(&self, id: &VideoId) -> Result<Vec<Tag>, RepositoryError>;

    /// Videos joined through an exact tag match, in stable retrieval order.
    async fn videos_by_tag(&self, tag: &str) -> Result<Vec<Video>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}
