//! Preview engine — runs one evaluation tick per clock snapshot.
//!
//! ```text
//! ClockSnapshot ──> tick()
//!                    ├─ cache.poll()            drain finished loads
//!                    ├─ acquire + retain        referenced set only
//!                    ├─ evaluate_frame()        descriptors / pending / warnings
//!                    └─ audio.tick()            seek / play / pause / volume
//! ```
//!
//! The engine owns the resource cache and the audio controller. It never
//! blocks: loads finish on the cache's worker pool and are picked up by a
//! later tick.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use rv_audio::{AudioError, AudioSyncController, PlaybackBackend};
use rv_common::{ClockSnapshot, ElementId, PreviewConfig, RenderDescriptor};
use rv_media::{Acquire, LoadEvent, MediaLoader, ResourceCache, ResourceKind};
use rv_timeline_eval::{evaluate_frame, ElementKind, TimelineEvalError};

use crate::document::TimelineDocument;

/// Everything one tick produced.
#[derive(Debug, Default)]
pub struct TickOutput {
    /// Render descriptors in paint order.
    pub descriptors: Vec<RenderDescriptor>,
    /// Visible elements waiting for their media.
    pub pending: Vec<ElementId>,
    pub warnings: Vec<TimelineEvalError>,
    pub audio_errors: Vec<AudioError>,
    /// Loads that completed (or were discarded) since the previous tick.
    pub load_events: Vec<LoadEvent>,
    /// The clock owner must pause playback.
    pub pause_requested: bool,
    /// At least one load is still in flight.
    pub loading: bool,
}

/// Per-tick orchestrator over the resource cache and audio controller.
pub struct PreviewEngine {
    config: PreviewConfig,
    cache: ResourceCache,
    audio: AudioSyncController,
    ticks: u64,
    shut_down: bool,
}

impl std::fmt::Debug for PreviewEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewEngine")
            .field("cache", &self.cache)
            .field("audio", &self.audio)
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl PreviewEngine {
    pub fn new(
        config: PreviewConfig,
        loader: Arc<dyn MediaLoader>,
        backend: Box<dyn PlaybackBackend>,
    ) -> Self {
        let cache = ResourceCache::with_workers(loader, config.media.load_mode, config.media.load_workers);
        let audio = AudioSyncController::new(config.audio.clone(), backend);
        info!(
            load_mode = ?config.media.load_mode,
            workers = config.media.load_workers,
            canvas = %config.canvas,
            fps = %config.fps,
            "Preview engine created"
        );
        Self {
            config,
            cache,
            audio,
            ticks: 0,
            shut_down: false,
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn audio(&self) -> &AudioSyncController {
        &self.audio
    }

    /// Evaluate the document at `clock`.
    ///
    /// Never blocks on I/O. Elements whose media is still loading show up in
    /// [`TickOutput::pending`] and are drawn on the first tick after their
    /// load completes.
    pub fn tick(&mut self, doc: &TimelineDocument, clock: &ClockSnapshot) -> TickOutput {
        self.ticks += 1;
        let load_events = self.cache.poll();

        let mut referenced = HashSet::new();
        for (segment, media) in doc.timeline.media_refs() {
            let kind = match segment.kind {
                ElementKind::Video(_) => ResourceKind::Video,
                ElementKind::Image(_) => ResourceKind::Image,
                ElementKind::Text(_) => continue,
            };
            referenced.insert(segment.id.clone());
            if let Acquire::Failed(error) = self.cache.acquire(&segment.id, media, kind) {
                debug!(element = %segment.id, %error, "Media failed to load, not drawn");
            }
        }
        let audio_segments = doc.audio_segments();
        referenced.extend(
            audio_segments
                .iter()
                .filter(|segment| segment.media().is_some())
                .map(|segment| segment.id.clone()),
        );
        let released = self.cache.retain(&referenced);
        if released > 0 {
            debug!(released, "Released unreferenced resources");
        }

        let frame = evaluate_frame(&doc.timeline, clock, &self.cache, &self.config);
        let report = self.audio.tick(clock, &audio_segments, &mut self.cache);
        if report.pause_requested {
            warn!(time = %clock.current_time, "Audio playback blocked, requesting pause");
        }

        let output = TickOutput {
            descriptors: frame.descriptors,
            pending: frame.pending,
            warnings: frame.warnings,
            audio_errors: report.errors,
            load_events,
            pause_requested: report.pause_requested,
            loading: self.cache.pending_count() > 0,
        };
        debug!(
            tick = self.ticks,
            time = %clock.current_time,
            playing = clock.is_playing,
            drawn = output.descriptors.len(),
            pending = output.pending.len(),
            loading = output.loading,
            "Tick evaluated"
        );
        output
    }

    /// Forget a failed load so the next tick requests it again.
    pub fn retry(&mut self, element: &ElementId) -> bool {
        self.audio.retry(element, &mut self.cache) || self.cache.retry(element)
    }

    /// Pause all audio and release every resource. Safe to call twice.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        let audio = self.audio.shutdown(&mut self.cache);
        self.cache.shutdown();
        info!(ticks = self.ticks, audio_slots = audio, "Preview engine shut down");
    }
}

impl Drop for PreviewEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── Tests ──────────────────────────────────────────────────────────
