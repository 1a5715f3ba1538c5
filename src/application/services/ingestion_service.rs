use std::sync::Arc;

use crate::application::ports::{
    DemuxError, Embedder, LlmClient, MediaDemuxer, MetadataStore, RepositoryError,
    TranscriptionEngine, VectorIndex,
};
use crate::application::services::{TranscriptError, TranscriptService};
use crate::domain::{Frame, ImageSource, Tag, Video, VideoId};

/// Orchestrates one ingestion run: demux, transcribe and tag, persist
/// metadata, then embed and index.
///
/// Ordering is load-bearing: the video row and tag rows are committed before
/// any embedding work, so a reader can never observe vectors for a video
/// without metadata. The reverse, metadata with partial or zero vectors, is
/// an accepted degraded state; embedding and index failures after the
/// metadata commit are logged and reported through the receipt, not raised
/// as a caller-visible failure.
pub struct IngestionService<D, T, L, M, V>
where
    D: MediaDemuxer,
    T: TranscriptionEngine,
    L: LlmClient,
    M: MetadataStore,
    V: VectorIndex,
{
    demuxer: Arc<D>,
    transcripts: TranscriptService<T, L>,
    embedder: Arc<dyn Embedder>,
    metadata_store: Arc<M>,
    vector_index: Arc<V>,
    frame_rate: f64,
}

#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub video_id: VideoId,
    pub title: String,
    /// Caller-supplied upload timestamp, stored verbatim.
    pub timestamp: String,
    pub data: Vec<u8>,
}

/// Outcome of a successful ingestion run. `vectors_indexed` falls short of
/// `vectors_expected` when the embedding step degraded.
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    pub video_id: VideoId,
    pub tags: Vec<Tag>,
    pub frames_extracted: usize,
    pub vectors_expected: usize,
    pub vectors_indexed: usize,
}

impl IngestReceipt {
    pub fn is_degraded(&self) -> bool {
        self.vectors_indexed < self.vectors_expected
    }
}

impl<D, T, L, M, V> IngestionService<D, T, L, M, V>
where
    D: MediaDemuxer,
    T: TranscriptionEngine,
    L: LlmClient,
    M: MetadataStore,
    V: VectorIndex,
{
    pub fn new(
        demuxer: Arc<D>,
        transcripts: TranscriptService<T, L>,
        embedder: Arc<dyn Embedder>,
        metadata_store: Arc<M>,
        vector_index: Arc<V>,
        frame_rate: f64,
    ) -> Self {
        Self {
            demuxer,
            transcripts,
            embedder,
            metadata_store,
            vector_index,
            frame_rate,
        }
    }

    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestReceipt, IngestionError> {
        let output = self
            .demuxer
            .demux(&request.data, self.frame_rate)
            .await
            .map_err(IngestionError::Demux)?;

        tracing::info!(
            video_id = %request.video_id,
            frames = output.frames.len(),
            width = output.info.effective_width(),
            height = output.info.effective_height(),
            rotation = output.info.rotation.degrees(),
            "Demux completed"
        );

        let vocabulary = self
            .metadata_store
            .distinct_tags()
            .await
            .map_err(IngestionError::Metadata)?;

        let bundle = self
            .transcripts
            .process(&output.audio_wav, &vocabulary)
            .await
            .map_err(IngestionError::Transcript)?;

        // Metadata commits before any embedding work; see the type-level
        // ordering note.
        let video = Video::new(
            request.video_id,
            request.title,
            bundle.transcript,
            request.timestamp,
        );
        self.metadata_store
            .insert_video(&video)
            .await
            .map_err(IngestionError::Metadata)?;

        for tag in &bundle.tags {
            self.metadata_store
                .insert_tag(tag, &video.id)
                .await
                .map_err(IngestionError::Metadata)?;
        }

        let frames_extracted = output.frames.len();
        let vectors_expected = frames_extracted + 1;
        let vectors_indexed = self
            .embed_and_index(&video.id, output.frames, &bundle.condensed)
            .await;

        if vectors_indexed < vectors_expected {
            tracing::warn!(
                video_id = %video.id,
                vectors_indexed,
                vectors_expected,
                "Ingestion completed in degraded state"
            );
        } else {
            tracing::info!(video_id = %video.id, vectors_indexed, "Ingestion completed");
        }

        Ok(IngestReceipt {
            video_id: video.id,
            tags: bundle.tags,
            frames_extracted,
            vectors_expected,
            vectors_indexed,
        })
    }

    /// Best-effort embedding and indexing. Returns the number of vectors
    /// that made it into the index; failures are logged, never raised.
    async fn embed_and_index(
        &self,
        video_id: &VideoId,
        frames: Vec<Frame>,
        condensed: &str,
    ) -> usize {
        let mut indexed = 0;

        let images: Vec<ImageSource> = frames.into_iter().map(ImageSource::from).collect();
        match self.embedder.encode_images(images).await {
            Ok(embeddings) => {
                for embedding in &embeddings {
                    match self.vector_index.insert(embedding, video_id).await {
                        Ok(()) => indexed += 1,
                        Err(e) => {
                            tracing::warn!(video_id = %video_id, error = %e, "Vector insert failed");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(video_id = %video_id, error = %e, "Frame embedding failed");
            }
        }

        match self.embedder.encode_text(condensed).await {
            Ok(embedding) => match self.vector_index.insert(&embedding, video_id).await {
                Ok(()) => indexed += 1,
                Err(e) => {
                    tracing::warn!(
                        video_id = %video_id,
                        error = %e,
                        "Transcript vector insert failed"
                    );
                }
            },
            Err(e) => {
                tracing::warn!(video_id = %video_id, error = %e, "Transcript embedding failed");
            }
        }

        indexed
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("demux: {0}")]
    Demux(DemuxError),
    #[error("transcript: {0}")]
    Transcript(TranscriptError),
    #[error("metadata: {0}")]
    Metadata(RepositoryError),
}
