//! `rv-audio` — keeps audio segments in step with the preview clock.
//!
//! - **Types**: [`AudioSegment`] windows with per-segment volume keyframes
//! - **Playback**: the [`PlaybackBackend`] / [`PlaybackHandle`] output seam
//! - **Sync**: [`AudioSyncController`], one slot per segment, driven once per tick
//!
//! # Per-tick flow
//!
//! ```text
//! ResourceCache ──acquire/poll──> slot (Loading → Ready)
//!                                   │
//! ClockSnapshot ──────────────────> drift check → seek / play / pause → volume
//! ```
//!
//! Decoded buffers stay owned by the shared `rv_media::ResourceCache`; the
//! controller only opens playback handles on top of them.

pub mod error;
pub mod playback;
pub mod sync;
pub mod types;

pub use error::AudioError;
pub use playback::{NullBackend, NullHandle, PlaybackBackend, PlaybackError, PlaybackHandle};
pub use sync::{AudioSyncController, SlotState, SyncReport};
pub use types::{AudioLayer, AudioSegment};
