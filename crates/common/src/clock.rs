//! Per-tick clock snapshot.

use serde::{Deserialize, Serialize};

use crate::types::TimeCode;

/// Playback position and transport state, captured once per tick.
///
/// Every component evaluated during a tick sees the same snapshot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub current_time: TimeCode,
    pub is_playing: bool,
}

impl ClockSnapshot {
    pub fn playing(secs: f64) -> Self {
        Self {
            current_time: TimeCode::from_secs(secs),
            is_playing: true,
        }
    }

    pub fn paused(secs: f64) -> Self {
        Self {
            current_time: TimeCode::from_secs(secs),
            is_playing: false,
        }
    }

    pub fn secs(&self) -> f64 {
        self.current_time.as_secs()
    }
}
