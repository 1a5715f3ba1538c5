mod memory_metadata_store;
mod memory_vector_index;
mod qdrant_index;
mod sqlite_metadata_store;
mod sqlite_pool;

pub use memory_metadata_store::InMemoryMetadataStore;
pub use memory_vector_index::InMemoryVectorIndex;
pub use qdrant_index::QdrantVectorIndex;
pub use sqlite_metadata_store::SqliteMetadataStore;
pub use sqlite_pool::{create_pool, run_migrations};
