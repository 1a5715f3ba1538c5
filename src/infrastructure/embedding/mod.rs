mod clip_embedder;
mod lazy_embedder;

pub use clip_embedder::{ClipEmbedder, DEFAULT_MODEL_ID};
pub use lazy_embedder::LazyEmbedder;
