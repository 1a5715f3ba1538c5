use std::sync::Arc;

use clipdex::application::ports::{
    Embedder, EmbedderError, MetadataStore, VectorHit, VectorIndex, VectorIndexError,
};
use clipdex::application::services::{SearchQuery, SearchService};
use clipdex::domain::{Embedding, ImageSource, Tag, Video, VideoId, EMBEDDING_DIM};
use clipdex::infrastructure::persistence::{InMemoryMetadataStore, InMemoryVectorIndex};

const TEST_CANDIDATE_POOL: usize = 10;
const TEST_MAX_RESULTS: usize = 3;

struct MockEmbedder;

#[async_trait::async_trait]
impl Embedder for MockEmbedder {
    async fn encode_images(
        &self,
        images: Vec<ImageSource>,
    ) -> Result<Vec<Embedding>, EmbedderError> {
        Ok(images
            .into_iter()
            .map(|_| Embedding::normalized(vec![1.0; EMBEDDING_DIM]))
            .collect())
    }

    async fn encode_text(&self, _text: &str) -> Result<Embedding, EmbedderError> {
        Ok(Embedding::normalized(vec![1.0; EMBEDDING_DIM]))
    }

    async fn encode_text_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        Ok(texts
            .iter()
            .map(|_| Embedding::normalized(vec![1.0; EMBEDDING_DIM]))
            .collect())
    }
}

/// Replays a fixed ranked hit list regardless of the query vector.
struct ScriptedIndex {
    hits: Vec<VectorHit>,
}

#[async_trait::async_trait]
impl VectorIndex for ScriptedIndex {
    async fn insert(
        &self,
        _embedding: &Embedding,
        _video_id: &VideoId,
    ) -> Result<(), VectorIndexError> {
        Ok(())
    }

    async fn search(
        &self,
        _embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<VectorHit>, VectorIndexError> {
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }
}

fn hit(id: &str, distance: f32) -> VectorHit {
    VectorHit {
        video_id: VideoId::new(id),
        distance,
    }
}

async fn store_with_videos(ids: &[&str]) -> Arc<InMemoryMetadataStore> {
    let store = Arc::new(InMemoryMetadataStore::new());
    for id in ids {
        let video = Video::new(
            VideoId::new(*id),
            format!("video {id}"),
            "transcript",
            "2024-06-01T12:00:00Z",
        );
        store.insert_video(&video).await.unwrap();
    }
    store
}

#[tokio::test]
async fn given_repeated_hits_per_video_when_searching_then_first_occurrence_wins() {
    let store = store_with_videos(&["a", "b", "c"]).await;
    let index = Arc::new(ScriptedIndex {
        hits: vec![
            hit("a", 0.1),
            hit("a", 0.2),
            hit("b", 0.3),
            hit("a", 0.4),
            hit("c", 0.5),
            hit("b", 0.6),
        ],
    });
    let service = SearchService::new(
        Arc::new(MockEmbedder),
        store,
        index,
        TEST_CANDIDATE_POOL,
        TEST_MAX_RESULTS,
    );

    let matches = service
        .search(SearchQuery::Text("query".to_string()))
        .await
        .unwrap();

    let ids: Vec<&str> = matches.iter().map(|m| m.video.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(matches[0].distance, Some(0.1));
    assert_eq!(matches[1].distance, Some(0.3));
    assert_eq!(matches[2].distance, Some(0.5));
}

#[tokio::test]
async fn given_more_distinct_videos_than_cap_when_searching_then_results_are_capped() {
    let store = store_with_videos(&["a", "b", "c", "d"]).await;
    let index = Arc::new(ScriptedIndex {
        hits: vec![
            hit("a", 0.1),
            hit("b", 0.2),
            hit("c", 0.3),
            hit("d", 0.4),
        ],
    });
    let service = SearchService::new(
        Arc::new(MockEmbedder),
        store,
        index,
        TEST_CANDIDATE_POOL,
        TEST_MAX_RESULTS,
    );

    let matches = service
        .search(SearchQuery::Text("query".to_string()))
        .await
        .unwrap();

    assert_eq!(matches.len(), TEST_MAX_RESULTS);
}

#[tokio::test]
async fn given_fewer_distinct_videos_than_cap_when_searching_then_all_are_returned() {
    let store = store_with_videos(&["a", "b"]).await;
    let index = Arc::new(ScriptedIndex {
        hits: vec![hit("a", 0.1), hit("b", 0.2), hit("a", 0.3)],
    });
    let service = SearchService::new(
        Arc::new(MockEmbedder),
        store,
        index,
        TEST_CANDIDATE_POOL,
        TEST_MAX_RESULTS,
    );

    let matches = service
        .search(SearchQuery::Text("query".to_string()))
        .await
        .unwrap();

    assert_eq!(matches.len(), 2);
}

#[tokio::test]
async fn given_hit_without_metadata_row_when_searching_then_hit_is_skipped() {
    let store = store_with_videos(&["a", "c"]).await;
    let index = Arc::new(ScriptedIndex {
        hits: vec![hit("a", 0.1), hit("ghost", 0.2), hit("c", 0.3)],
    });
    let service = SearchService::new(
        Arc::new(MockEmbedder),
        store,
        index,
        TEST_CANDIDATE_POOL,
        TEST_MAX_RESULTS,
    );

    let matches = service
        .search(SearchQuery::Text("query".to_string()))
        .await
        .unwrap();

    let ids: Vec<&str> = matches.iter().map(|m| m.video.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[tokio::test]
async fn given_empty_index_when_searching_then_empty_list_is_returned() {
    let store = store_with_videos(&[]).await;
    let index = Arc::new(InMemoryVectorIndex::new());
    let service = SearchService::new(
        Arc::new(MockEmbedder),
        store,
        index,
        TEST_CANDIDATE_POOL,
        TEST_MAX_RESULTS,
    );

    let matches = service
        .search(SearchQuery::Text("query".to_string()))
        .await
        .unwrap();

    assert!(matches.is_empty());
}

#[tokio::test]
async fn given_matching_tag_when_searching_then_videos_carry_their_full_tag_list() {
    let store = store_with_videos(&["a", "b"]).await;
    store
        .insert_tag(&Tag::new("beach").unwrap(), &VideoId::new("a"))
        .await
        .unwrap();
    store
        .insert_tag(&Tag::new("sunset").unwrap(), &VideoId::new("a"))
        .await
        .unwrap();
    store
        .insert_tag(&Tag::new("cooking").unwrap(), &VideoId::new("b"))
        .await
        .unwrap();

    let service = SearchService::new(
        Arc::new(MockEmbedder),
        store,
        Arc::new(InMemoryVectorIndex::new()),
        TEST_CANDIDATE_POOL,
        TEST_MAX_RESULTS,
    );

    let matches = service
        .search(SearchQuery::Tag("beach".to_string()))
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].video.id.as_str(), "a");
    assert_eq!(matches[0].distance, None);

    let tags: Vec<&str> = matches[0].tags.iter().map(|t| t.as_str()).collect();
    assert_eq!(tags, vec!["beach", "sunset"]);
}

#[tokio::test]
async fn given_unknown_tag_when_searching_then_empty_list_is_returned() {
    let store = store_with_videos(&["a"]).await;
    let service = SearchService::new(
        Arc::new(MockEmbedder),
        store,
        Arc::new(InMemoryVectorIndex::new()),
        TEST_CANDIDATE_POOL,
        TEST_MAX_RESULTS,
    );

    let matches = service
        .search(SearchQuery::Tag("nonexistent".to_string()))
        .await
        .unwrap();

    assert!(matches.is_empty());
}
