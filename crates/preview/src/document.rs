//! Timeline documents: the per-tick input, loaded from JSON.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use rv_audio::{AudioLayer, AudioSegment};
use rv_timeline_eval::Timeline;

use crate::error::{PreviewError, PreviewResult};

/// A complete composition: the visual timeline plus audio layers.
///
/// The visual fields are flattened, so the JSON form is
/// `{ "canvas", "layers", "transitions", "audio_layers" }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimelineDocument {
    #[serde(flatten)]
    pub timeline: Timeline,
    #[serde(default)]
    pub audio_layers: Vec<AudioLayer>,
}

impl TimelineDocument {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            audio_layers: Vec::new(),
        }
    }

    /// All audio segments, layer by layer.
    pub fn audio_segments(&self) -> Vec<&AudioSegment> {
        self.audio_layers
            .iter()
            .flat_map(|layer| layer.segments.iter())
            .collect()
    }

    /// End of the last visual or audio segment.
    pub fn duration(&self) -> f64 {
        let visual = self
            .timeline
            .layers
            .iter()
            .flat_map(|layer| layer.segments.iter())
            .map(|segment| segment.timeline_end().as_secs());
        let audio = self
            .audio_layers
            .iter()
            .flat_map(|layer| layer.segments.iter())
            .map(|segment| segment.end().as_secs());
        visual.chain(audio).fold(0.0, f64::max)
    }

    /// Check the structural requirements evaluation relies on.
    ///
    /// Element ids key the shared resource cache, so they must be unique
    /// across visual and audio segments.
    pub fn validate(&self) -> PreviewResult<()> {
        if let Some(canvas) = self.timeline.canvas {
            if canvas.width == 0 || canvas.height == 0 {
                return Err(PreviewError::InvalidDocument {
                    reason: format!("invalid canvas: {canvas}"),
                });
            }
        }

        let mut seen = HashSet::new();
        let visual = self
            .timeline
            .layers
            .iter()
            .flat_map(|layer| layer.segments.iter())
            .map(|segment| &segment.id);
        let audio = self
            .audio_layers
            .iter()
            .flat_map(|layer| layer.segments.iter())
            .map(|segment| &segment.id);
        for id in visual.chain(audio) {
            if !seen.insert(id) {
                return Err(PreviewError::InvalidDocument {
                    reason: format!("duplicate element id {id}"),
                });
            }
        }
        Ok(())
    }
}

/// Parse and validate a document from a JSON string.
pub fn from_json_str(json: &str) -> PreviewResult<TimelineDocument> {
    let doc: TimelineDocument = serde_json::from_str(json)?;
    debug!(
        layers = doc.timeline.layers.len(),
        transitions = doc.timeline.transitions.len(),
        audio_layers = doc.audio_layers.len(),
        "Parsed timeline document"
    );
    doc.validate()?;
    Ok(doc)
}

/// Load a document from a JSON file.
pub fn load_document(path: &Path) -> PreviewResult<TimelineDocument> {
    if !path.is_file() {
        return Err(PreviewError::NotFound {
            path: path.display().to_string(),
        });
    }

    let json = std::fs::read_to_string(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to read timeline document");
        PreviewError::Io(e)
    })?;
    let doc = from_json_str(&json)?;

    info!(
        path = %path.display(),
        canvas = ?doc.timeline.canvas,
        duration = doc.duration(),
        "Timeline document loaded"
    );
    Ok(doc)
}
