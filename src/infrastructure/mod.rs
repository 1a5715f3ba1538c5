pub mod embedding;
pub mod llm;
pub mod media;
pub mod observability;
pub mod persistence;
pub mod transcription;
