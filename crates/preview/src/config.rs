//! Preview configuration loading.

use std::path::Path;

use tracing::{debug, info};

use rv_common::PreviewConfig;

use crate::error::{PreviewError, PreviewResult};

/// Parse a configuration from JSON. Missing fields take their defaults.
pub fn config_from_json_str(json: &str) -> PreviewResult<PreviewConfig> {
    let config: PreviewConfig = serde_json::from_str(json)?;
    validate_config(&config)?;
    debug!(?config, "Parsed preview config");
    Ok(config)
}

/// Load the configuration file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> PreviewResult<PreviewConfig> {
    let Some(path) = path else {
        debug!("No config file given, using defaults");
        return Ok(PreviewConfig::default());
    };
    if !path.is_file() {
        return Err(PreviewError::NotFound {
            path: path.display().to_string(),
        });
    }

    let json = std::fs::read_to_string(path)?;
    let config = config_from_json_str(&json)?;
    info!(path = %path.display(), fps = %config.fps, load_mode = ?config.media.load_mode, "Config loaded");
    Ok(config)
}

fn validate_config(config: &PreviewConfig) -> PreviewResult<()> {
    let invalid = |reason: String| Err(PreviewError::InvalidConfig { reason });
    if config.canvas.width == 0 || config.canvas.height == 0 {
        return invalid(format!("invalid canvas {}", config.canvas));
    }
    if config.fps.num == 0 || config.fps.den == 0 {
        return invalid(format!("invalid fps {}/{}", config.fps.num, config.fps.den));
    }
    if config.media.load_workers == 0 {
        return invalid("load_workers must be at least 1".to_string());
    }
    let threshold = config.audio.resync_threshold;
    if threshold.is_nan() || threshold < 0.0 {
        return invalid(format!(
            "resync threshold must be non-negative, got {threshold}"
        ));
    }
    if !(0.0..=1.0).contains(&config.audio.default_volume) {
        return invalid(format!(
            "default volume must be within 0..1, got {}",
            config.audio.default_volume
        ));
    }
    Ok(())
}
