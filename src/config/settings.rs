use crate::infrastructure::embedding::DEFAULT_MODEL_ID;

/// Runtime configuration, built from environment variables with sensible
/// local-development defaults. Wiring of components from these settings is
/// the caller's responsibility.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub qdrant: QdrantSettings,
    pub embeddings: EmbeddingSettings,
    pub transcription: TranscriptionSettings,
    pub generation: GenerationSettings,
    pub ingestion: IngestionSettings,
    pub search: SearchSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct QdrantSettings {
    pub url: String,
    pub collection_name: String,
}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub model_id: String,
}

#[derive(Debug, Clone)]
pub struct TranscriptionSettings {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IngestionSettings {
    /// Frames sampled per second of video.
    pub frame_rate: f64,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub environment: String,
    /// Emit JSON log lines instead of the human-readable format.
    pub json_format: bool,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Raw nearest-neighbor candidates pulled before dedup.
    pub candidate_pool: usize,
    /// Distinct videos returned per semantic query.
    pub max_results: usize,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            database: DatabaseSettings {
                url: env_or("DATABASE_URL", "sqlite://clipdex.db"),
                max_connections: parsed_env_or("DATABASE_MAX_CONNECTIONS", 5),
            },
            qdrant: QdrantSettings {
                url: env_or("QDRANT_URL", "http://localhost:6334"),
                collection_name: env_or("QDRANT_COLLECTION", "clip_embeddings"),
            },
            embeddings: EmbeddingSettings {
                model_id: env_or("EMBEDDING_MODEL_ID", DEFAULT_MODEL_ID),
            },
            transcription: TranscriptionSettings {
                api_key: env_or("TRANSCRIPTION_API_KEY", ""),
                base_url: std::env::var("TRANSCRIPTION_BASE_URL").ok(),
                model: std::env::var("TRANSCRIPTION_MODEL").ok(),
            },
            generation: GenerationSettings {
                api_key: env_or("GENERATION_API_KEY", ""),
                base_url: std::env::var("GENERATION_BASE_URL").ok(),
                model: std::env::var("GENERATION_MODEL").ok(),
            },
            ingestion: IngestionSettings {
                frame_rate: parsed_env_or("INGESTION_FRAME_RATE", 1.0),
            },
            search: SearchSettings {
                candidate_pool: parsed_env_or("SEARCH_CANDIDATE_POOL", 10),
                max_results: parsed_env_or("SEARCH_MAX_RESULTS", 3),
            },
            logging: LoggingSettings {
                environment: env_or("APP_ENV", "development"),
                json_format: std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
