//! `rv-preview` — Per-tick preview orchestration for reelview timelines.
//!
//! - **Document**: [`TimelineDocument`] JSON loading and validation
//! - **Config**: [`load_config`] over [`PreviewConfig`](rv_common::PreviewConfig)
//! - **Engine**: [`PreviewEngine`] ties the resource cache, timeline
//!   evaluation and audio sync together, one [`tick`](PreviewEngine::tick)
//!   per clock snapshot
//! - **Playback**: [`PlaybackClock`], the reference transport driving ticks

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod playback;

pub use config::{config_from_json_str, load_config};
pub use document::{from_json_str, load_document, TimelineDocument};
pub use engine::{PreviewEngine, TickOutput};
pub use error::{PreviewError, PreviewResult};
pub use playback::{format_time, PlaybackClock, PlaybackMode};
