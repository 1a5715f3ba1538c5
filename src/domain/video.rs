use std::fmt;

/// Opaque, caller-supplied video identifier.
///
/// Identity is never generated by this crate; the uploader owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted video record. Created exactly once by a successful ingestion
/// run and immutable thereafter; no update path exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    pub transcript: String,
    /// Caller-supplied upload timestamp, stored verbatim.
    pub timestamp: String,
}

impl Video {
    pub fn new(
        id: VideoId,
        title: impl Into<String>,
        transcript: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            transcript: transcript.into(),
            timestamp: timestamp.into(),
        }
    }
}
