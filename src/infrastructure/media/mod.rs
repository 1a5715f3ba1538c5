mod ffmpeg_demuxer;
mod jpeg_stream;

pub use ffmpeg_demuxer::FfmpegDemuxer;
pub use jpeg_stream::JpegStreamParser;
