/// Display rotation of a video stream, normalized to a right angle.
///
/// Sources report rotation either through the classic `rotate` tag or the
/// display-matrix side data; both are reduced to one of four states here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Normalize a reported rotation in degrees. Negative values wrap
    /// (−90 ≡ 270); anything that is not a right angle is treated as
    /// unrotated.
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => Self::R90,
            180 => Self::R180,
            270 => Self::R270,
            _ => Self::R0,
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }

    /// Quarter-turn rotations swap the effective width and height.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Self::R90 | Self::R270)
    }

    /// The ffmpeg filter fragment that presents frames upright: one
    /// quarter-turn for 90, the opposite for 270, two for 180.
    pub fn transpose_filter(&self) -> Option<&'static str> {
        match self {
            Self::R0 => None,
            Self::R90 => Some("transpose=1"),
            Self::R180 => Some("transpose=1,transpose=1"),
            Self::R270 => Some("transpose=2"),
        }
    }
}

/// Probed stream metadata for one container.
///
/// `source_width`/`source_height` are the pre-rotation dimensions; sampling
/// filters operate on those, so they are kept separate from the effective
/// (post-rotation) dimensions consumers see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaInfo {
    pub source_width: u32,
    pub source_height: u32,
    pub rotation: Rotation,
    pub has_audio: bool,
}

impl MediaInfo {
    pub fn effective_width(&self) -> u32 {
        if self.rotation.swaps_dimensions() {
            self.source_height
        } else {
            self.source_width
        }
    }

    pub fn effective_height(&self) -> u32 {
        if self.rotation.swaps_dimensions() {
            self.source_width
        } else {
            self.source_height
        }
    }
}
