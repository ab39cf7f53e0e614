//! Element box sizing.
//!
//! Boxes are centred on the canvas by the renderer; this module only decides
//! the unscaled box size and the text metrics.

use rv_common::{Resolution, TextConfig};

use crate::types::{ImageSource, TextContent, VideoSource};

/// Intrinsic size assumed for videos without explicit dimensions (portrait HD).
pub const DEFAULT_VIDEO_SIZE: [f32; 2] = [1080.0, 1920.0];

pub fn video_size(video: &VideoSource) -> [f32; 2] {
    [
        video.width.map_or(DEFAULT_VIDEO_SIZE[0], |w| w as f32),
        video.height.map_or(DEFAULT_VIDEO_SIZE[1], |h| h as f32),
    ]
}

/// Images without explicit dimensions fill the canvas.
pub fn image_size(image: &ImageSource, canvas: Resolution) -> [f32; 2] {
    let [cw, ch] = canvas.as_size();
    [
        image.width.map_or(cw, |w| w as f32),
        image.height.map_or(ch, |h| h as f32),
    ]
}

/// Approximate text block metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct TextMetrics {
    pub font_size: f32,
    pub line_height: f32,
    pub size: [f32; 2],
}

pub fn text_metrics(text: &TextContent, config: &TextConfig) -> TextMetrics {
    let font_size = config.base_font_size;
    let line_height = font_size * config.line_height_factor;
    let longest = text
        .text
        .lines()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let lines = text.text.lines().count().max(1);

    TextMetrics {
        font_size,
        line_height,
        size: [
            longest as f32 * config.char_width_factor * font_size,
            lines as f32 * line_height,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_defaults_to_portrait_hd() {
        assert_eq!(video_size(&VideoSource::default()), [1080.0, 1920.0]);
        let sized = VideoSource {
            width: Some(640),
            height: Some(360),
            ..Default::default()
        };
        assert_eq!(video_size(&sized), [640.0, 360.0]);
    }

    #[test]
    fn image_defaults_to_canvas() {
        assert_eq!(
            image_size(&ImageSource::default(), Resolution::HD),
            [1920.0, 1080.0]
        );
    }

    #[test]
    fn text_metrics_estimate() {
        let text = TextContent {
            text: "Hello\nWorld!!".into(),
            ..Default::default()
        };
        let m = text_metrics(&text, &TextConfig::default());
        assert!((m.font_size - 24.0).abs() < 1e-6);
        assert!((m.line_height - 28.8).abs() < 1e-4);
        assert!((m.size[0] - 7.0 * 0.6 * 24.0).abs() < 1e-3);
        assert!((m.size[1] - 2.0 * 28.8).abs() < 1e-3);
    }

    #[test]
    fn empty_text_has_one_line() {
        let m = text_metrics(&TextContent::default(), &TextConfig::default());
        assert_eq!(m.size[0], 0.0);
        assert!((m.size[1] - 28.8).abs() < 1e-4);
    }
}
