use clipdex::application::ports::{MetadataStore, RepositoryError};
use clipdex::domain::{Tag, Video, VideoId};
use clipdex::infrastructure::persistence::{create_pool, run_migrations, SqliteMetadataStore};

async fn store() -> SqliteMetadataStore {
    // A single connection keeps every query on the same in-memory database.
    let pool = create_pool("sqlite::memory:", 1).await.unwrap();
    run_migrations(&pool).await.unwrap();
    SqliteMetadataStore::new(pool)
}

fn video(id: &str) -> Video {
    Video::new(
        VideoId::new(id),
        format!("video {id}"),
        "a transcript",
        "2024-06-01T12:00:00Z",
    )
}

#[tokio::test]
async fn given_inserted_video_when_reading_by_id_then_row_round_trips() {
    let store = store().await;
    store.insert_video(&video("v1")).await.unwrap();

    let found = store.video_by_id(&VideoId::new("v1")).await.unwrap();

    assert_eq!(found, Some(video("v1")));
}

#[tokio::test]
async fn given_missing_id_when_reading_then_none() {
    let store = store().await;
    assert!(store
        .video_by_id(&VideoId::new("missing"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn given_duplicate_video_id_when_inserting_then_constraint_violation() {
    let store = store().await;
    store.insert_video(&video("v1")).await.unwrap();

    let result = store.insert_video(&video("v1")).await;

    assert!(matches!(
        result,
        Err(RepositoryError::ConstraintViolation(_))
    ));
}

#[tokio::test]
async fn given_tag_rows_when_listing_distinct_tags_then_duplicates_collapse() {
    let store = store().await;
    store.insert_video(&video("v1")).await.unwrap();
    store.insert_video(&video("v2")).await.unwrap();

    let beach = Tag::new("beach").unwrap();
    let cooking = Tag::new("cooking").unwrap();
    store.insert_tag(&beach, &VideoId::new("v1")).await.unwrap();
    store.insert_tag(&beach, &VideoId::new("v2")).await.unwrap();
    store
        .insert_tag(&cooking, &VideoId::new("v2"))
        .await
        .unwrap();

    let tags = store.distinct_tags().await.unwrap();

    assert_eq!(tags, vec!["beach", "cooking"]);
}

#[tokio::test]
async fn given_tagged_videos_when_querying_by_tag_then_each_video_appears_once() {
    let store = store().await;
    store.insert_video(&video("v1")).await.unwrap();
    store.insert_video(&video("v2")).await.unwrap();

    let beach = Tag::new("beach").unwrap();
    store.insert_tag(&beach, &VideoId::new("v1")).await.unwrap();
    store.insert_tag(&beach, &VideoId::new("v1")).await.unwrap();
    store.insert_tag(&beach, &VideoId::new("v2")).await.unwrap();

    let videos = store.videos_by_tag("beach").await.unwrap();

    let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2"]);
}

#[tokio::test]
async fn given_tags_in_insert_order_when_reading_for_video_then_order_is_preserved() {
    let store = store().await;
    store.insert_video(&video("v1")).await.unwrap();

    for name in ["sunset", "beach", "travel"] {
        store
            .insert_tag(&Tag::new(name).unwrap(), &VideoId::new("v1"))
            .await
            .unwrap();
    }

    let tags = store.tags_for_video(&VideoId::new("v1")).await.unwrap();

    let names: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();
    assert_eq!(names, vec!["sunset", "beach", "travel"]);
}

#[tokio::test]
async fn given_unknown_tag_when_querying_then_empty_list() {
    let store = store().await;
    store.insert_video(&video("v1")).await.unwrap();

    assert!(store.videos_by_tag("nonexistent").await.unwrap().is_empty());
}
