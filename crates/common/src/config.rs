//! Configuration structs for the preview pipeline.

use serde::{Deserialize, Serialize};

use crate::types::{Rational, Resolution};

/// How media loads are executed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Loads run on a fixed pool of worker threads.
    #[default]
    Threaded,
    /// Load synchronously inside `acquire`; completion still arrives via `poll`.
    Inline,
}

/// Top-level preview configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub canvas: Resolution,
    pub fps: Rational,
    pub audio: AudioSyncConfig,
    pub text: TextConfig,
    pub media: MediaConfig,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            canvas: Resolution::PORTRAIT_HD,
            fps: Rational::FPS_25,
            audio: AudioSyncConfig::default(),
            text: TextConfig::default(),
            media: MediaConfig::default(),
        }
    }
}

/// Audio synchronization tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSyncConfig {
    /// Drift (seconds) above which the playback handle is force-seeked.
    pub resync_threshold: f64,
    /// Volume used when a segment does not specify one.
    pub default_volume: f32,
}

impl Default for AudioSyncConfig {
    fn default() -> Self {
        Self {
            resync_threshold: 0.5,
            default_volume: 1.0,
        }
    }
}

/// Text layout settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub base_font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height_factor: f32,
    /// Approximate glyph advance as a multiple of the font size.
    pub char_width_factor: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            base_font_size: 24.0,
            line_height_factor: 1.2,
            char_width_factor: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub load_mode: LoadMode,
    /// Size of the threaded load pool; caps concurrent loads.
    pub load_workers: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            load_mode: LoadMode::default(),
            load_workers: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PreviewConfig::default();
        assert_eq!(cfg.canvas, Resolution::PORTRAIT_HD);
        assert_eq!(cfg.fps, Rational::FPS_25);
        assert!((cfg.audio.resync_threshold - 0.5).abs() < 1e-12);
        assert!((cfg.text.base_font_size - 24.0).abs() < 1e-6);
        assert_eq!(cfg.media.load_mode, LoadMode::Threaded);
        assert_eq!(cfg.media.load_workers, 4);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: PreviewConfig =
            serde_json::from_str(r#"{"audio":{"resync_threshold":0.25},"media":{"load_mode":"inline"}}"#)
                .unwrap();
        assert!((cfg.audio.resync_threshold - 0.25).abs() < 1e-12);
        assert!((cfg.audio.default_volume - 1.0).abs() < 1e-6);
        assert_eq!(cfg.media.load_mode, LoadMode::Inline);
        assert_eq!(cfg.canvas, Resolution::PORTRAIT_HD);
    }
}
