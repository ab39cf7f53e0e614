//! `rv-common` — Shared types for the reelview preview core.
//!
//! This crate is the foundation that all other preview crates depend on:
//!
//! - **Types**: `TimeCode`, `Rational`, `Resolution`, `ElementId`, `MediaRef` (newtypes for safety)
//! - **Clock**: `ClockSnapshot` (one per tick, shared by every component)
//! - **Gate**: `ReadinessGate` (draw/playback gating on decoded media)
//! - **Descriptor**: `RenderDescriptor`, `Transform2D`, `ClipRegion` (renderer interface)
//! - **Filters**: `FilterDesc`, `FlipAxis`
//! - **Config**: `PreviewConfig` and its sections

pub mod clock;
pub mod config;
pub mod descriptor;
pub mod filter;
pub mod gate;
pub mod types;

// Re-export commonly used items at crate root
pub use clock::ClockSnapshot;
pub use config::{AudioSyncConfig, LoadMode, MediaConfig, PreviewConfig, TextConfig};
pub use descriptor::{
    ClipRegion, DrawSource, InsetRect, RenderDescriptor, TextAlign, TextStyle, Transform2D,
};
pub use filter::{FilterDesc, FlipAxis};
pub use gate::{AlwaysReady, ReadinessGate};
pub use types::{ElementId, MediaRef, Rational, Resolution, TimeCode};
