use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::clip::{ClipConfig, ClipModel};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;

use crate::application::ports::{Embedder, EmbedderError};
use crate::domain::{l2_normalize, Embedding, ImageSource};

pub const DEFAULT_MODEL_ID: &str = "openai/clip-vit-base-patch32";

/// Characters kept from any text before tokenization. The tokenizer's own
/// truncation at the context length is a second safety net, not a
/// substitute.
const MAX_TEXT_CHARS: usize = 300;

const CONTEXT_LENGTH: usize = 77;

/// CLIP ViT-B/32 on candle: images and text map into the same 512-dimension
/// space, L2-normalized at encode time.
///
/// Construction downloads and loads weights, which takes seconds, so this
/// type is meant to be built once behind [`super::LazyEmbedder`] and shared.
pub struct ClipEmbedder {
    model: ClipModel,
    tokenizer: Tokenizer,
    device: Device,
    image_size: usize,
    pad_id: u32,
}

impl ClipEmbedder {
    pub fn new(model_id: &str) -> Result<Self, EmbedderError> {
        let device = Self::select_device();

        tracing::info!(device = ?device, model = model_id, "Initializing CLIP embedding model");

        let api = Api::new().map_err(|e| EmbedderError::ModelLoadFailed(e.to_string()))?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| EmbedderError::ModelLoadFailed(format!("tokenizer.json: {}", e)))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| EmbedderError::ModelLoadFailed(format!("model.safetensors: {}", e)))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| EmbedderError::ModelLoadFailed(format!("tokenizer: {}", e)))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: CONTEXT_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| EmbedderError::ModelLoadFailed(format!("truncation config: {}", e)))?;

        let pad_id = tokenizer
            .get_vocab(true)
            .get("<|endoftext|>")
            .copied()
            .ok_or_else(|| {
                EmbedderError::ModelLoadFailed("tokenizer vocab missing <|endoftext|>".to_string())
            })?;

        let config = ClipConfig::vit_base_patch32();

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(|e| EmbedderError::ModelLoadFailed(format!("weights: {}", e)))?
        };

        let model = ClipModel::new(vb, &config)
            .map_err(|e| EmbedderError::ModelLoadFailed(format!("model: {}", e)))?;

        tracing::info!("CLIP embedding model loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            image_size: config.image_size,
            pad_id,
        })
    }

    fn select_device() -> Device {
        Device::new_metal(0)
            .or_else(|_| Device::new_cuda(0))
            .unwrap_or(Device::Cpu)
    }

    fn image_to_tensor(&self, source: ImageSource) -> Result<Tensor, EmbedderError> {
        let image = source
            .decode()
            .map_err(|e| EmbedderError::InvalidImage(e.to_string()))?;

        let size = self.image_size as u32;
        let rgb = image
            .resize_to_fill(size, size, image::imageops::FilterType::Triangle)
            .to_rgb8();
        let data = rgb.into_raw();

        Tensor::from_vec(data, (self.image_size, self.image_size, 3), &Device::Cpu)
            .and_then(|t| t.permute((2, 0, 1)))
            .and_then(|t| t.to_dtype(DType::F32))
            .and_then(|t| t.affine(2.0 / 255.0, -1.0))
            .map_err(|e| EmbedderError::InferenceFailed(e.to_string()))
    }

    fn features_to_embeddings(&self, features: &Tensor) -> Result<Vec<Embedding>, EmbedderError> {
        let rows: Vec<Vec<f32>> = features
            .to_dtype(DType::F32)
            .and_then(|t| t.to_vec2())
            .map_err(|e| EmbedderError::InferenceFailed(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|mut values| {
                l2_normalize(&mut values);
                Embedding::new(values)
            })
            .collect())
    }

    fn encode_image_batch(&self, images: Vec<ImageSource>) -> Result<Vec<Embedding>, EmbedderError> {
        let mut tensors = Vec::with_capacity(images.len());
        for source in images {
            tensors.push(self.image_to_tensor(source)?);
        }

        let pixel_values = Tensor::stack(&tensors, 0)
            .and_then(|t| t.to_device(&self.device))
            .map_err(|e| EmbedderError::InferenceFailed(e.to_string()))?;

        let features = self
            .model
            .get_image_features(&pixel_values)
            .map_err(|e| EmbedderError::InferenceFailed(e.to_string()))?;

        self.features_to_embeddings(&features)
    }

    fn encode_texts(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        let mut token_batches: Vec<Vec<u32>> = Vec::with_capacity(texts.len());
        for text in texts {
            let truncated: String = text.chars().take(MAX_TEXT_CHARS).collect();
            let encoding = self
                .tokenizer
                .encode(truncated, true)
                .map_err(|e| EmbedderError::InferenceFailed(format!("tokenization: {}", e)))?;
            token_batches.push(encoding.get_ids().to_vec());
        }

        let max_len = token_batches.iter().map(|t| t.len()).max().unwrap_or(0);
        for tokens in &mut token_batches {
            tokens.resize(max_len, self.pad_id);
        }

        let input_ids = Tensor::new(token_batches, &self.device)
            .map_err(|e| EmbedderError::InferenceFailed(e.to_string()))?;

        let features = self
            .model
            .get_text_features(&input_ids)
            .map_err(|e| EmbedderError::InferenceFailed(e.to_string()))?;

        self.features_to_embeddings(&features)
    }
}

#[async_trait]
impl Embedder for ClipEmbedder {
    async fn encode_images(
        &self,
        images: Vec<ImageSource>,
    ) -> Result<Vec<Embedding>, EmbedderError> {
        if images.is_empty() {
            return Ok(Vec::new());
        }
        self.encode_image_batch(images)
    }

    async fn encode_text(&self, text: &str) -> Result<Embedding, EmbedderError> {
        self.encode_texts(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbedderError::InferenceFailed("empty result".to_string()))
    }

    async fn encode_text_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.encode_texts(texts)
    }
}
