mod settings;

pub use settings::{
    DatabaseSettings, EmbeddingSettings, GenerationSettings, IngestionSettings, LoggingSettings,
    QdrantSettings, SearchSettings, Settings, TranscriptionSettings,
};
