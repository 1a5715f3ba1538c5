mod embedder;
mod llm_client;
mod media_demuxer;
mod metadata_store;
mod transcription_engine;
mod vector_index;

pub use embedder::{Embedder, EmbedderError};
pub use llm_client::{LlmClient, LlmClientError};
pub use media_demuxer::{DemuxError, DemuxOutput, MediaDemuxer};
pub use metadata_store::{MetadataStore, RepositoryError};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
pub use vector_index::{VectorHit, VectorIndex, VectorIndexError};
