use async_trait::async_trait;

use crate::domain::{Frame, MediaInfo};

/// Extracts audio and orientation-corrected frames from raw container bytes.
#[async_trait]
pub trait MediaDemuxer: Send + Sync {
    /// Probe the container and extract a decodable WAV audio stream plus
    /// upright still frames sampled at `frame_rate` frames per second.
    async fn demux(&self, data: &[u8], frame_rate: f64) -> Result<DemuxOutput, DemuxError>;
}

#[derive(Debug)]
pub struct DemuxOutput {
    pub info: MediaInfo,
    /// Mono 16 kHz PCM WAV, regardless of the source audio codec.
    pub audio_wav: Vec<u8>,
    /// Frames in presentation order, already rotated upright and downscaled.
    pub frames: Vec<Frame>,
}

#[derive(Debug, thiserror::Error)]
pub enum DemuxError {
    #[error("no video stream found in container")]
    NoVideoStream,
    #[error("no audio stream found in container")]
    NoAudioStream,
    #[error("probe failed: {0}")]
    ProbeFailed(String),
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("io: {0}")]
    Io(String),
}
