//! Resource handles owned by the cache.

use std::fmt;

use rv_common::{ElementId, MediaRef, TimeCode};
use serde::{Deserialize, Serialize};

/// Monotonic identifier of a resident handle. Never reused within a cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an element needs its media decoded into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Video,
    Image,
    Audio,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "video",
            Self::Image => "image",
            Self::Audio => "audio",
        };
        f.write_str(name)
    }
}

/// Payload produced by a [`MediaLoader`](crate::MediaLoader).
///
/// `token` values are opaque to the cache; they identify resources owned by
/// an external decoder or renderer and are handed back on destroy.
#[derive(Debug, PartialEq)]
pub enum DecodedMedia {
    /// Raw bytes for an external decoder.
    Stream { bytes: Vec<u8> },
    VideoFrames {
        token: u64,
        width: u32,
        height: u32,
        duration: TimeCode,
    },
    ImageTexture { token: u64, width: u32, height: u32 },
    AudioBuffer {
        token: u64,
        sample_rate: u32,
        channels: u16,
        duration: TimeCode,
    },
}

impl DecodedMedia {
    /// Approximate resident size in bytes, for logging.
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Stream { bytes } => bytes.len(),
            Self::ImageTexture { width, height, .. } => *width as usize * *height as usize * 4,
            Self::VideoFrames { .. } | Self::AudioBuffer { .. } => 0,
        }
    }
}

/// A decoded resource resident in the cache, keyed by element id.
#[derive(Debug)]
pub struct ResourceHandle {
    pub id: HandleId,
    pub element: ElementId,
    pub media_ref: MediaRef,
    pub kind: ResourceKind,
    pub media: DecodedMedia,
}
