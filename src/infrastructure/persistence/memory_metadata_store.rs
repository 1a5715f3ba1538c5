use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{MetadataStore, RepositoryError};
use crate::domain::{Tag, Video, VideoId};

#[derive(Default)]
struct Inner {
    videos: Vec<Video>,
    tags: Vec<(Tag, VideoId)>,
}

/// In-memory metadata store with the same contract as the SQLite adapter:
/// unique video ids, one row per (tag, video) association, stable insertion
/// order for joined reads.
pub struct InMemoryMetadataStore {
    inner: RwLock<Inner>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert_video(&self, video: &Video) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.videos.iter().any(|v| v.id == video.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate video id: {}",
                video.id
            )));
        }
        inner.videos.push(video.clone());
        Ok(())
    }

    async fn insert_tag(&self, tag: &Tag, video_id: &VideoId) -> Result<(), RepositoryError> {
        self.inner
            .write()
            .await
            .tags
            .push((tag.clone(), video_id.clone()));
        Ok(())
    }

    async fn distinct_tags(&self) -> Result<Vec<String>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut tags: Vec<String> = inner
            .tags
            .iter()
            .map(|(tag, _)| tag.as_str().to_string())
            .collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }

    async fn video_by_id(&self, id: &VideoId) -> Result<Option<Video>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.videos.iter().find(|v| &v.id == id).cloned())
    }

    async fn tags_for_video(&self, id: &VideoId) -> Result<Vec<Tag>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tags
            .iter()
            .filter(|(_, video_id)| video_id == id)
            .map(|(tag, _)| tag.clone())
            .collect())
    }

    async fn videos_by_tag(&self, tag: &str) -> Result<Vec<Video>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut videos = Vec::new();
        for video in &inner.videos {
            let matched = inner
                .tags
                .iter()
                .any(|(t, video_id)| t.as_str() == tag && video_id == &video.id);
            if matched {
                videos.push(video.clone());
            }
        }
        Ok(videos)
    }
}
