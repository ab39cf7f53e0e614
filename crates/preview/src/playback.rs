//! Reference transport: play/pause, seek and fixed-step advance.
//!
//! The preview core never owns the clock; this is the clock the CLI and the
//! tests drive. Each tick takes a [`ClockSnapshot`] from it and feeds pause
//! requests back through [`PlaybackClock::force_pause`].

use rv_common::{ClockSnapshot, TimeCode};
use serde::{Deserialize, Serialize};

/// Current transport mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// Stopped at the start (or never started).
    #[default]
    Stopped,
    Playing,
    /// Paused at the current position (can resume).
    Paused,
}

/// Transport state for one composition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaybackClock {
    pub mode: PlaybackMode,
    pub current_time: TimeCode,
    /// Composition length; playback pauses here.
    pub duration: TimeCode,
}

impl PlaybackClock {
    pub fn new(duration: TimeCode) -> Self {
        Self {
            mode: PlaybackMode::Stopped,
            current_time: TimeCode::ZERO,
            duration,
        }
    }

    pub fn play(&mut self) {
        if self.is_at_end() {
            self.current_time = TimeCode::ZERO;
        }
        self.mode = PlaybackMode::Playing;
        tracing::debug!(time = %self.current_time, "Playback started");
    }

    pub fn pause(&mut self) {
        if self.mode == PlaybackMode::Playing {
            self.mode = PlaybackMode::Paused;
            tracing::debug!(time = %self.current_time, "Playback paused");
        }
    }

    /// Pause requested by the preview core (e.g. blocked audio playback).
    pub fn force_pause(&mut self) {
        if self.mode == PlaybackMode::Playing {
            self.mode = PlaybackMode::Paused;
            tracing::info!(time = %self.current_time, "Playback paused by preview core");
        }
    }

    /// Toggle between playing and paused. If stopped, starts playing.
    pub fn toggle_play_pause(&mut self) {
        match self.mode {
            PlaybackMode::Playing => self.pause(),
            PlaybackMode::Paused | PlaybackMode::Stopped => self.play(),
        }
    }

    /// Seek to a time, clamped to `[0, duration]`. Stopped becomes paused.
    pub fn seek(&mut self, time: TimeCode) {
        let secs = time.as_secs().clamp(0.0, self.duration.as_secs().max(0.0));
        self.current_time = TimeCode::from_secs(secs);
        if self.mode == PlaybackMode::Stopped {
            self.mode = PlaybackMode::Paused;
        }
        tracing::debug!(time = %self.current_time, "Seeked");
    }

    /// Move the playhead forward by `dt` of wall time while playing.
    ///
    /// Reaching the end pauses there.
    pub fn advance(&mut self, dt: TimeCode) {
        if self.mode != PlaybackMode::Playing {
            return;
        }
        let next = self.current_time.as_secs() + dt.as_secs();
        if next < self.duration.as_secs() {
            self.current_time = TimeCode::from_secs(next);
        } else {
            self.current_time = self.duration;
            self.mode = PlaybackMode::Paused;
            tracing::debug!(time = %self.current_time, "Reached end, pausing");
        }
    }

    pub fn is_playing(&self) -> bool {
        self.mode == PlaybackMode::Playing
    }

    pub fn is_at_end(&self) -> bool {
        self.current_time.as_secs() >= self.duration.as_secs()
    }

    /// The snapshot every component sees for one tick.
    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            current_time: self.current_time,
            is_playing: self.is_playing(),
        }
    }
}

/// Format seconds as `MM:SS.cc` (centiseconds).
pub fn format_time(secs: f64) -> String {
    let total_cs = (secs.max(0.0) * 100.0).floor() as u64;
    let minutes = total_cs / 6000;
    let seconds = (total_cs / 100) % 60;
    let centis = total_cs % 100;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> TimeCode {
        TimeCode::from_secs(s)
    }

    #[test]
    fn new_clock_defaults() {
        let clock = PlaybackClock::new(secs(10.0));
        assert_eq!(clock.mode, PlaybackMode::Stopped);
        assert_eq!(clock.current_time.as_secs(), 0.0);
        assert!(!clock.snapshot().is_playing);
    }

    #[test]
    fn play_pause_cycle() {
        let mut clock = PlaybackClock::new(secs(10.0));
        clock.play();
        assert!(clock.snapshot().is_playing);

        clock.advance(secs(1.5));
        assert!((clock.current_time.as_secs() - 1.5).abs() < 1e-9);

        clock.pause();
        clock.advance(secs(1.0));
        assert!((clock.current_time.as_secs() - 1.5).abs() < 1e-9);

        clock.play();
        assert!(clock.is_playing());
        assert!((clock.current_time.as_secs() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn toggle_play_pause() {
        let mut clock = PlaybackClock::new(secs(10.0));
        clock.toggle_play_pause();
        assert_eq!(clock.mode, PlaybackMode::Playing);
        clock.toggle_play_pause();
        assert_eq!(clock.mode, PlaybackMode::Paused);
        clock.toggle_play_pause();
        assert_eq!(clock.mode, PlaybackMode::Playing);
    }

    #[test]
    fn seek_clamps_and_leaves_stopped() {
        let mut clock = PlaybackClock::new(secs(10.0));
        clock.seek(secs(12.0));
        assert_eq!(clock.mode, PlaybackMode::Paused);
        assert_eq!(clock.current_time.as_secs(), 10.0);
        clock.seek(secs(-3.0));
        assert_eq!(clock.current_time.as_secs(), 0.0);
    }

    #[test]
    fn advance_pauses_at_end() {
        let mut clock = PlaybackClock::new(secs(2.0));
        clock.play();
        clock.advance(secs(1.5));
        clock.advance(secs(1.0));
        assert_eq!(clock.mode, PlaybackMode::Paused);
        assert_eq!(clock.current_time.as_secs(), 2.0);

        // Playing again from the end restarts.
        clock.play();
        assert_eq!(clock.current_time.as_secs(), 0.0);
    }

    #[test]
    fn advance_moves_by_wall_time_and_never_wraps() {
        let mut clock = PlaybackClock::new(secs(2.0));
        clock.play();
        clock.advance(secs(0.25));
        assert!((clock.current_time.as_secs() - 0.25).abs() < 1e-9);

        // Overshooting the end lands on the end, not past or around it.
        clock.advance(secs(7.5));
        assert!(!clock.is_playing());
        assert!(clock.is_at_end());
        assert_eq!(clock.current_time.as_secs(), 2.0);
        clock.advance(secs(1.0));
        assert_eq!(clock.current_time.as_secs(), 2.0);
    }

    #[test]
    fn force_pause_only_affects_playing() {
        let mut clock = PlaybackClock::new(secs(10.0));
        clock.force_pause();
        assert_eq!(clock.mode, PlaybackMode::Stopped);
        clock.play();
        clock.force_pause();
        assert_eq!(clock.mode, PlaybackMode::Paused);
    }

    #[test]
    fn format_time_values() {
        assert_eq!(format_time(0.0), "00:00.00");
        assert_eq!(format_time(1.5), "00:01.50");
        assert_eq!(format_time(61.25), "01:01.25");
        assert_eq!(format_time(600.0), "10:00.00");
        assert_eq!(format_time(-4.0), "00:00.00");
    }
}
