//! Recognition domain types.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Crop rectangle in pixel coordinates. All-zero means the full image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CropBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl CropBox {
    pub const FULL: CropBox = CropBox {
        x1: 0,
        y1: 0,
        x2: 0,
        y2: 0,
    };

    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    pub fn as_args(&self) -> [String; 4] {
        [
            self.x1.to_string(),
            self.y1.to_string(),
            self.x2.to_string(),
            self.y2.to_string(),
        ]
    }
}

/// One call across the recognition boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    pub image_path: PathBuf,
    pub crop: CropBox,
}

/// The engine's best guess for a photo. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentificationResult {
    pub album: String,
    pub artist: String,
}

impl IdentificationResult {
    pub fn has_album(&self) -> bool {
        self.album != UNKNOWN_ALBUM
    }

    pub fn has_artist(&self) -> bool {
        self.artist != UNKNOWN_ARTIST
    }
}

/// Failures at the call boundary itself. Safe to retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeFault {
    #[error("recognition engine unavailable: {0}")]
    Unavailable(String),

    #[error("recognition engine crashed ({status}): {stderr}")]
    Crashed { status: String, stderr: String },

    #[error("recognition engine timed out after {0:?}")]
    Timeout(Duration),

    #[error("recognition engine returned malformed output: {0}")]
    Malformed(String),

    #[error("recognition transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    #[error(transparent)]
    Bridge(#[from] BridgeFault),

    /// The engine ran and answered with an error. Retrying won't help.
    #[error("{message}")]
    Identification { message: String },
}

impl RecognitionError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Bridge(_))
    }
}
