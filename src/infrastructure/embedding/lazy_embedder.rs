use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::clip_embedder::ClipEmbedder;
use crate::application::ports::{Embedder, EmbedderError};
use crate::domain::{Embedding, ImageSource};

/// Process-wide shared embedder with idempotent lazy construction.
///
/// Model load takes seconds, so it is deferred to first use and guarded by a
/// `OnceCell`: concurrent first callers race to exactly one load, everyone
/// else awaits the same instance. Inference afterwards is read-only and safe
/// to share. The wrapper itself is an explicitly constructed, injectable
/// component rather than a module-level global.
pub struct LazyEmbedder {
    cell: OnceCell<Arc<ClipEmbedder>>,
    model_id: String,
}

impl LazyEmbedder {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            cell: OnceCell::new(),
            model_id: model_id.into(),
        }
    }

    async fn instance(&self) -> Result<&Arc<ClipEmbedder>, EmbedderError> {
        self.cell
            .get_or_try_init(|| async {
                let model_id = self.model_id.clone();
                // The load is CPU/IO heavy; keep it off the async workers.
                tokio::task::spawn_blocking(move || ClipEmbedder::new(&model_id).map(Arc::new))
                    .await
                    .map_err(|e| EmbedderError::ModelLoadFailed(format!("join: {}", e)))?
            })
            .await
    }
}

#[async_trait]
impl Embedder for LazyEmbedder {
    async fn encode_images(
        &self,
        images: Vec<ImageSource>,
    ) -> Result<Vec<Embedding>, EmbedderError> {
        // An empty batch must not trigger the model load.
        if images.is_empty() {
            return Ok(Vec::new());
        }
        self.instance().await?.encode_images(images).await
    }

    async fn encode_text(&self, text: &str) -> Result<Embedding, EmbedderError> {
        self.instance().await?.encode_text(text).await
    }

    async fn encode_text_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.instance().await?.encode_text_batch(texts).await
    }
}
