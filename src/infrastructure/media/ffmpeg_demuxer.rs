use std::io::Write;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::instrument;

use super::jpeg_stream::JpegStreamParser;
use crate::application::ports::{DemuxError, DemuxOutput, MediaDemuxer};
use crate::domain::{Frame, MediaInfo, Rotation};

/// Neither frame dimension exceeds this after downscaling, to bound
/// embedding cost. Aspect ratio is preserved and small frames are never
/// upscaled.
const MAX_FRAME_EDGE: u32 = 320;

const READ_CHUNK: usize = 64 * 1024;

/// ffmpeg/ffprobe subprocess demuxer.
///
/// The container bytes are staged in a temp file scoped to one call and
/// released on every exit path. Frames come back as MJPEG over a pipe rather
/// than raw pixel buffers: raw extraction breaks silently on any mismatch
/// between computed and actual dimensions, while each JPEG decodes
/// independently and a bad one can be skipped.
pub struct FfmpegDemuxer {
    ffmpeg_bin: String,
    ffprobe_bin: String,
}

impl FfmpegDemuxer {
    pub fn new() -> Self {
        Self::with_binaries("ffmpeg", "ffprobe")
    }

    pub fn with_binaries(ffmpeg_bin: impl Into<String>, ffprobe_bin: impl Into<String>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            ffprobe_bin: ffprobe_bin.into(),
        }
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, DemuxError> {
        let output = Command::new(&self.ffprobe_bin)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .output()
            .await
            .map_err(|e| DemuxError::Io(format!("spawn ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(DemuxError::ProbeFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| DemuxError::ProbeFailed(format!("parse: {}", e)))?;

        let video = probe
            .streams
            .iter()
            .find(|s| s.codec_type == "video")
            .ok_or(DemuxError::NoVideoStream)?;
        let has_audio = probe.streams.iter().any(|s| s.codec_type == "audio");

        let source_width = video
            .width
            .ok_or_else(|| DemuxError::ProbeFailed("video stream without width".to_string()))?;
        let source_height = video
            .height
            .ok_or_else(|| DemuxError::ProbeFailed("video stream without height".to_string()))?;

        Ok(MediaInfo {
            source_width,
            source_height,
            rotation: video.rotation(),
            has_audio,
        })
    }

    async fn extract_audio(&self, path: &Path) -> Result<Vec<u8>, DemuxError> {
        let output = Command::new(&self.ffmpeg_bin)
            .args(["-v", "error", "-i"])
            .arg(path)
            .args([
                "-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1", "-f", "wav", "pipe:1",
            ])
            .output()
            .await
            .map_err(|e| DemuxError::Io(format!("spawn ffmpeg: {}", e)))?;

        if !output.status.success() {
            return Err(DemuxError::ExtractionFailed(format!(
                "audio: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        tracing::debug!(bytes = output.stdout.len(), "Audio extracted to WAV");
        Ok(output.stdout)
    }

    async fn extract_frames(
        &self,
        path: &Path,
        rotation: Rotation,
        frame_rate: f64,
    ) -> Result<Vec<Frame>, DemuxError> {
        // Autorotation is disabled so the inverse rotation is applied as an
        // explicit filter step, before consumers interpret dimensions.
        let mut filter = format!("fps={}", frame_rate);
        if let Some(transpose) = rotation.transpose_filter() {
            filter.push(',');
            filter.push_str(transpose);
        }
        filter.push_str(&format!(
            ",scale='min({max},iw)':'min({max},ih)':force_original_aspect_ratio=decrease",
            max = MAX_FRAME_EDGE
        ));

        let mut child = Command::new(&self.ffmpeg_bin)
            .args(["-v", "error", "-noautorotate", "-i"])
            .arg(path)
            .args(["-vf", &filter, "-f", "image2pipe", "-vcodec", "mjpeg", "-q:v", "3", "pipe:1"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DemuxError::Io(format!("spawn ffmpeg: {}", e)))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| DemuxError::Io("ffmpeg stdout unavailable".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DemuxError::Io("ffmpeg stderr unavailable".to_string()))?;

        // Drain stderr concurrently: ffmpeg blocks once the pipe buffer
        // fills, which would stall the stdout loop below.
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        let mut parser = JpegStreamParser::new();
        let mut frames: Vec<Frame> = Vec::new();
        let mut emitted = 0usize;
        let mut chunk = vec![0u8; READ_CHUNK];

        loop {
            let read = stdout
                .read(&mut chunk)
                .await
                .map_err(|e| DemuxError::Io(format!("read frames: {}", e)))?;
            if read == 0 {
                break;
            }

            for jpeg in parser.push(&chunk[..read]) {
                emitted += 1;
                match image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg) {
                    Ok(img) => frames.push(Frame::new(frames.len(), img)),
                    Err(e) => {
                        // A bad frame never aborts the run.
                        tracing::warn!(sequence = emitted, error = %e, "Skipping undecodable frame");
                    }
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DemuxError::Io(format!("wait ffmpeg: {}", e)))?;
        let stderr_bytes = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes).trim().to_string();
            if frames.is_empty() {
                return Err(DemuxError::ExtractionFailed(format!("frames: {}", stderr)));
            }
            tracing::warn!(error = %stderr, frames = frames.len(), "ffmpeg exited non-zero after emitting frames");
        }

        Ok(frames)
    }
}

impl Default for FfmpegDemuxer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaDemuxer for FfmpegDemuxer {
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn demux(&self, data: &[u8], frame_rate: f64) -> Result<DemuxOutput, DemuxError> {
        let staged = data.to_vec();
        let tmp = tokio::task::spawn_blocking(move || -> Result<NamedTempFile, std::io::Error> {
            let mut file = tempfile::Builder::new().suffix(".mp4").tempfile()?;
            file.write_all(&staged)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(|e| DemuxError::Io(format!("stage temp file: {}", e)))?
        .map_err(|e| DemuxError::Io(format!("stage temp file: {}", e)))?;

        let info = self.probe(tmp.path()).await?;
        if !info.has_audio {
            // Probed before any extraction work: a silent container is
            // rejected outright rather than ingested with an empty
            // transcript.
            return Err(DemuxError::NoAudioStream);
        }

        let audio_wav = self.extract_audio(tmp.path()).await?;
        let frames = self
            .extract_frames(tmp.path(), info.rotation, frame_rate)
            .await?;

        tracing::info!(
            frames = frames.len(),
            rotation = info.rotation.degrees(),
            "Demux finished"
        );

        Ok(DemuxOutput {
            info,
            audio_wav,
            frames,
        })
    }
}

#[derive(Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    tags: FfprobeTags,
    #[serde(default)]
    side_data_list: Vec<FfprobeSideData>,
}

#[derive(Deserialize, Default)]
struct FfprobeTags {
    rotate: Option<String>,
}

#[derive(Deserialize)]
struct FfprobeSideData {
    rotation: Option<f64>,
}

impl FfprobeStream {
    /// The classic `rotate` tag wins; otherwise the display-matrix side data
    /// is used, with its sign flipped to match the tag convention.
    fn rotation(&self) -> Rotation {
        if let Some(deg) = self.tags.rotate.as_deref().and_then(|r| r.parse::<i64>().ok()) {
            return Rotation::from_degrees(deg);
        }
        if let Some(deg) = self
            .side_data_list
            .iter()
            .find_map(|s| s.rotation)
        {
            return Rotation::from_degrees(-(deg.round() as i64));
        }
        Rotation::R0
    }
}
