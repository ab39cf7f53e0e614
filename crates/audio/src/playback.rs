//! Audio output seam: backends open playback handles for decoded resources.

use rv_common::{ElementId, TimeCode};
use rv_media::ResourceHandle;
use thiserror::Error;

/// Rejection of a playback request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// Autoplay / user-gesture policy refused to start playback.
    #[error("playback blocked: {0}")]
    Blocked(String),

    #[error("{0}")]
    Other(String),
}

/// One playing (or pausable) audio stream.
///
/// Every call is a non-blocking request; implementations queue work to their
/// output thread and report failures as values.
pub trait PlaybackHandle {
    /// Current position inside the source audio.
    fn position(&self) -> TimeCode;
    fn seek(&mut self, to: TimeCode);
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// Enough data is buffered to start playback without stalling.
    fn is_buffered(&self) -> bool;
    fn set_volume(&mut self, volume: f32);
}

/// Audio output device/driver abstraction.
pub trait PlaybackBackend {
    fn open(
        &mut self,
        element: &ElementId,
        resource: &ResourceHandle,
    ) -> Result<Box<dyn PlaybackHandle>, PlaybackError>;
}

/// Backend without an output device: handles keep their requested state
/// but never advance. Used for headless previews.
#[derive(Debug, Default)]
pub struct NullBackend;

impl PlaybackBackend for NullBackend {
    fn open(
        &mut self,
        _element: &ElementId,
        _resource: &ResourceHandle,
    ) -> Result<Box<dyn PlaybackHandle>, PlaybackError> {
        Ok(Box::new(NullHandle::default()))
    }
}

#[derive(Debug)]
pub struct NullHandle {
    position: TimeCode,
    paused: bool,
    volume: f32,
}

impl Default for NullHandle {
    fn default() -> Self {
        Self {
            position: TimeCode::ZERO,
            paused: true,
            volume: 1.0,
        }
    }
}

impl NullHandle {
    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl PlaybackHandle for NullHandle {
    fn position(&self) -> TimeCode {
        self.position
    }

    fn seek(&mut self, to: TimeCode) {
        self.position = to;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_buffered(&self) -> bool {
        true
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}
