use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::DynamicImage;

/// An ordered, ephemeral frame produced by demuxing. Lives only long enough
/// to be embedded; never persisted.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: usize,
    pub image: DynamicImage,
}

impl Frame {
    pub fn new(index: usize, image: DynamicImage) -> Self {
        Self { index, image }
    }
}

/// The accepted image inputs for embedding, with one decode path per variant.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// An encoded image (JPEG, PNG, ...) as raw bytes.
    Bytes(Vec<u8>),
    /// An encoded image wrapped in base64.
    Base64(String),
    /// An already-decoded image.
    Decoded(DynamicImage),
}

impl ImageSource {
    pub fn decode(self) -> Result<DynamicImage, ImageSourceError> {
        match self {
            Self::Bytes(data) => image::load_from_memory(&data)
                .map_err(|e| ImageSourceError::DecodeFailed(e.to_string())),
            Self::Base64(encoded) => {
                let data = BASE64
                    .decode(encoded.as_bytes())
                    .map_err(|e| ImageSourceError::InvalidBase64(e.to_string()))?;
                image::load_from_memory(&data)
                    .map_err(|e| ImageSourceError::DecodeFailed(e.to_string()))
            }
            Self::Decoded(image) => Ok(image),
        }
    }
}

impl From<Frame> for ImageSource {
    fn from(frame: Frame) -> Self {
        Self::Decoded(frame.image)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImageSourceError {
    #[error("image decoding failed: {0}")]
    DecodeFailed(String),
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}
