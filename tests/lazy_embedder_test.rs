use clipdex::application::ports::Embedder;
use clipdex::infrastructure::embedding::LazyEmbedder;

// An unresolvable model id makes any accidental load attempt visible as an
// error, so these tests prove the empty inputs never touch the model.

#[tokio::test]
async fn given_empty_image_batch_when_encoding_then_empty_batch_without_model_load() {
    let embedder = LazyEmbedder::new("nonexistent/never-a-model");

    let embeddings = embedder.encode_images(Vec::new()).await.unwrap();

    assert!(embeddings.is_empty());
}

#[tokio::test]
async fn given_empty_text_batch_when_encoding_then_empty_batch_without_model_load() {
    let embedder = LazyEmbedder::new("nonexistent/never-a-model");

    let embeddings = embedder.encode_text_batch(&[]).await.unwrap();

    assert!(embeddings.is_empty());
}
