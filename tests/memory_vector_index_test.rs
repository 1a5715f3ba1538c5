use clipdex::application::ports::VectorIndex;
use clipdex::domain::{Embedding, VideoId};
use clipdex::infrastructure::persistence::InMemoryVectorIndex;

fn basis(axis: usize) -> Embedding {
    let mut values = vec![0.0; 4];
    values[axis] = 1.0;
    Embedding::new(values)
}

#[tokio::test]
async fn given_stored_vectors_when_searching_then_closest_first() {
    let index = InMemoryVectorIndex::new();
    index.insert(&basis(0), &VideoId::new("x")).await.unwrap();
    index.insert(&basis(1), &VideoId::new("y")).await.unwrap();
    index
        .insert(&Embedding::new(vec![0.9, 0.1, 0.0, 0.0]), &VideoId::new("z"))
        .await
        .unwrap();

    let hits = index.search(&basis(0), 10).await.unwrap();

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].video_id.as_str(), "x");
    assert_eq!(hits[0].distance, 0.0);
    assert_eq!(hits[1].video_id.as_str(), "z");
    assert_eq!(hits[2].video_id.as_str(), "y");
}

#[tokio::test]
async fn given_top_k_smaller_than_store_when_searching_then_results_are_truncated() {
    let index = InMemoryVectorIndex::new();
    for i in 0..5 {
        index
            .insert(&basis(i % 4), &VideoId::new(format!("v{i}")))
            .await
            .unwrap();
    }

    let hits = index.search(&basis(0), 2).await.unwrap();

    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn given_same_video_inserted_twice_when_searching_then_both_entries_surface() {
    let index = InMemoryVectorIndex::new();
    index.insert(&basis(0), &VideoId::new("v")).await.unwrap();
    index.insert(&basis(1), &VideoId::new("v")).await.unwrap();

    let hits = index.search(&basis(0), 10).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.video_id.as_str() == "v"));
}

#[tokio::test]
async fn given_empty_index_when_searching_then_no_hits() {
    let index = InMemoryVectorIndex::new();
    assert!(index.search(&basis(0), 10).await.unwrap().is_empty());
    assert!(index.is_empty().await);
}
