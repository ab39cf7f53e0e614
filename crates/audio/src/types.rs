//! Audio timeline types.

use rv_common::{ElementId, MediaRef, TimeCode};
use rv_timeline_eval::{keyframe, Keyframe};
use serde::{Deserialize, Serialize};

/// A group of audio segments. Layers carry no ordering semantics for audio;
/// they are flattened before synchronization.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AudioLayer {
    #[serde(default)]
    pub segments: Vec<AudioSegment>,
}

/// A timed audio element.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AudioSegment {
    pub id: ElementId,
    pub media: Option<MediaRef>,
    pub timeline_start: TimeCode,
    /// End of the playback window. Falls back to `timeline_start + duration`.
    #[serde(default)]
    pub timeline_end: Option<TimeCode>,
    #[serde(default)]
    pub duration: Option<TimeCode>,
    /// Offset into the source audio at which the segment starts.
    #[serde(default)]
    pub start_within_audio: TimeCode,
    /// Base volume (0..1); the configured default when absent.
    #[serde(default)]
    pub volume: Option<f32>,
    /// Volume keyframes, timed relative to the segment start.
    #[serde(default)]
    pub volume_track: Vec<Keyframe>,
}

impl AudioSegment {
    pub fn new(
        id: impl Into<String>,
        media: impl Into<String>,
        timeline_start: TimeCode,
        timeline_end: TimeCode,
    ) -> Self {
        Self {
            id: ElementId::new(id),
            media: Some(MediaRef::new(media)),
            timeline_start,
            timeline_end: Some(timeline_end),
            duration: None,
            start_within_audio: TimeCode::ZERO,
            volume: None,
            volume_track: Vec::new(),
        }
    }

    pub fn end(&self) -> TimeCode {
        match (self.timeline_end, self.duration) {
            (Some(end), _) => end,
            (None, Some(duration)) => self.timeline_start + duration,
            (None, None) => self.timeline_start,
        }
    }

    /// Media reference, with blank references treated as missing.
    pub fn media(&self) -> Option<&MediaRef> {
        self.media.as_ref().filter(|m| !m.is_empty())
    }

    /// Returns `true` if `time` is inside the playback window `[start, end)`.
    pub fn is_active_at(&self, time: TimeCode) -> bool {
        let t = time.as_secs();
        t >= self.timeline_start.as_secs() && t < self.end().as_secs()
    }

    /// Position inside the source audio corresponding to timeline `time`.
    pub fn relative_time(&self, time: TimeCode) -> TimeCode {
        time - self.timeline_start + self.start_within_audio
    }

    /// Effective volume at a source position, clamped to `[0, 1]`.
    pub fn volume_at(&self, relative: TimeCode, default_volume: f32) -> f32 {
        let base = self.volume.unwrap_or(default_volume);
        let local = relative - self.start_within_audio;
        keyframe::evaluate(&self.volume_track, local, base).clamp(0.0, 1.0)
    }
}
