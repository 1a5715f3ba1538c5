mod ingestion_service;
mod search_service;
mod transcript_service;

pub use ingestion_service::{IngestReceipt, IngestRequest, IngestionError, IngestionService};
pub use search_service::{SearchError, SearchQuery, SearchService, VideoMatch};
pub use transcript_service::{
    TranscriptBundle, TranscriptError, TranscriptService, CONDENSE_THRESHOLD,
};
