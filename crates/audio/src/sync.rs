//! Audio synchronization — keeps playback handles in step with the clock.
//!
//! Each audio segment owns one slot. A slot moves
//! `Unloaded → Loading → Ready → Playing ⇄ Paused`, or into `Failed`, which
//! it only leaves through [`AudioSyncController::retry`]. Decoded buffers
//! live in the shared [`ResourceCache`]; the slot holds the playback handle
//! opened on top of them and releases the cache entry when the segment goes
//! away.

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use rv_common::{AudioSyncConfig, ClockSnapshot, ElementId, MediaRef};
use rv_media::{Acquire, ResourceCache, ResourceKind};

use crate::error::AudioError;
use crate::playback::{PlaybackBackend, PlaybackError, PlaybackHandle};
use crate::types::AudioSegment;

/// Lifecycle state of one audio slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotState {
    Unloaded,
    Loading,
    Ready,
    Playing,
    Paused,
    Failed,
}

struct Slot {
    media: MediaRef,
    state: SlotState,
    handle: Option<Box<dyn PlaybackHandle>>,
}

impl Slot {
    fn new(media: MediaRef) -> Self {
        Self {
            media,
            state: SlotState::Unloaded,
            handle: None,
        }
    }
}

/// Outcome of one [`AudioSyncController::tick`].
#[derive(Debug, Default)]
pub struct SyncReport {
    pub errors: Vec<AudioError>,
    /// Playback was blocked; the caller must set the clock to paused.
    pub pause_requested: bool,
    /// Handles re-positioned because they drifted past the threshold.
    pub seeks: usize,
}

/// Owns one playback slot per audio segment.
pub struct AudioSyncController {
    config: AudioSyncConfig,
    backend: Box<dyn PlaybackBackend>,
    slots: HashMap<ElementId, Slot>,
    /// Segments already reported as missing media, reported once.
    missing: HashSet<ElementId>,
}

impl std::fmt::Debug for AudioSyncController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSyncController")
            .field("config", &self.config)
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl AudioSyncController {
    pub fn new(config: AudioSyncConfig, backend: Box<dyn PlaybackBackend>) -> Self {
        Self {
            config,
            backend,
            slots: HashMap::new(),
            missing: HashSet::new(),
        }
    }

    pub fn state(&self, element: &ElementId) -> Option<SlotState> {
        self.slots.get(element).map(|slot| slot.state)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Bring every slot in line with the clock.
    ///
    /// Never blocks on I/O: loads are started through the cache and picked
    /// up on a later tick once [`ResourceCache::poll`] has seen them finish.
    pub fn tick<S: Borrow<AudioSegment>>(
        &mut self,
        clock: &ClockSnapshot,
        segments: &[S],
        cache: &mut ResourceCache,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        self.drop_removed(segments, cache);

        let mut blocked = false;
        for segment in segments.iter().map(as_segment) {
            let Some(media) = segment.media() else {
                if self.missing.insert(segment.id.clone()) {
                    warn!(element = %segment.id, "Audio segment has no media reference");
                    report.errors.push(AudioError::MissingMediaReference {
                        element: segment.id.clone(),
                    });
                }
                continue;
            };
            self.missing.remove(&segment.id);

            self.advance_load(&segment.id, media, cache, &mut report);

            let Some(slot) = self.slots.get_mut(&segment.id) else {
                continue;
            };
            let Some(handle) = slot.handle.as_mut() else {
                continue;
            };

            if !clock.is_playing {
                if !handle.is_paused() {
                    handle.pause();
                }
                if slot.state == SlotState::Playing {
                    slot.state = SlotState::Paused;
                }
                continue;
            }

            let relative = segment.relative_time(clock.current_time);
            if segment.is_active_at(clock.current_time) {
                let drift = (handle.position().as_secs() - relative.as_secs()).abs();
                if drift > self.config.resync_threshold {
                    debug!(element = %segment.id, drift, target = %relative, "Resyncing audio");
                    handle.seek(relative);
                    report.seeks += 1;
                }

                if handle.is_paused() && handle.is_buffered() && !blocked {
                    match handle.play() {
                        Ok(()) => slot.state = SlotState::Playing,
                        Err(PlaybackError::Blocked(reason)) => {
                            warn!(element = %segment.id, %reason, "Audio playback blocked, pausing");
                            blocked = true;
                            report.pause_requested = true;
                            report.errors.push(AudioError::PlaybackBlocked {
                                element: segment.id.clone(),
                                reason,
                            });
                        }
                        Err(PlaybackError::Other(reason)) => {
                            warn!(element = %segment.id, %reason, "Audio playback failed");
                            report.errors.push(AudioError::PlaybackFailed {
                                element: segment.id.clone(),
                                reason,
                            });
                        }
                    }
                } else if !handle.is_paused() {
                    slot.state = SlotState::Playing;
                }
            } else {
                if !handle.is_paused() {
                    handle.pause();
                }
                if slot.state == SlotState::Playing {
                    slot.state = SlotState::Paused;
                }
            }

            handle.set_volume(segment.volume_at(relative, self.config.default_volume));
        }

        report
    }

    /// Release slots whose segment left the timeline (or lost its media).
    fn drop_removed<S: Borrow<AudioSegment>>(&mut self, segments: &[S], cache: &mut ResourceCache) {
        let live: HashSet<&ElementId> = segments
            .iter()
            .map(as_segment)
            .filter(|segment| segment.media().is_some())
            .map(|segment| &segment.id)
            .collect();
        let gone: Vec<ElementId> = self
            .slots
            .keys()
            .filter(|id| !live.contains(id))
            .cloned()
            .collect();
        for id in gone {
            self.release_slot(&id, cache);
        }
        self.missing
            .retain(|id| segments.iter().any(|s| &as_segment(s).id == id));
    }

    fn advance_load(
        &mut self,
        element: &ElementId,
        media: &MediaRef,
        cache: &mut ResourceCache,
        report: &mut SyncReport,
    ) {
        let changed = self.slots.get(element).is_some_and(|slot| &slot.media != media);
        if changed {
            debug!(element = %element, media = %media, "Audio media changed, reloading");
            self.release_slot(element, cache);
        }

        let slot = self
            .slots
            .entry(element.clone())
            .or_insert_with(|| Slot::new(media.clone()));

        if !matches!(slot.state, SlotState::Unloaded | SlotState::Loading) {
            return;
        }

        match cache.acquire(element, media, ResourceKind::Audio) {
            Acquire::Pending => slot.state = SlotState::Loading,
            Acquire::Ready(resource) => match self.backend.open(element, resource) {
                Ok(handle) => {
                    info!(element = %element, handle = %resource.id, "Audio ready");
                    slot.handle = Some(handle);
                    slot.state = SlotState::Ready;
                }
                Err(e) => {
                    warn!(element = %element, error = %e, "Failed to open audio output");
                    slot.state = SlotState::Failed;
                    report.errors.push(AudioError::PlaybackFailed {
                        element: element.clone(),
                        reason: e.to_string(),
                    });
                }
            },
            Acquire::Failed(error) => {
                slot.state = SlotState::Failed;
                report.errors.push(AudioError::ResourceLoadFailure {
                    element: element.clone(),
                    source: error.clone(),
                });
            }
        }
    }

    fn release_slot(&mut self, element: &ElementId, cache: &mut ResourceCache) {
        if let Some(mut slot) = self.slots.remove(element) {
            if let Some(handle) = slot.handle.as_mut() {
                if !handle.is_paused() {
                    handle.pause();
                }
            }
            drop(slot.handle.take());
            cache.release(element);
            debug!(element = %element, "Audio slot released");
        }
    }

    /// Reset a failed slot so the next tick loads it again.
    ///
    /// Returns `false` if the slot is not in the failed state.
    pub fn retry(&mut self, element: &ElementId, cache: &mut ResourceCache) -> bool {
        if self.state(element) != Some(SlotState::Failed) {
            return false;
        }
        self.slots.remove(element);
        // Opening may have failed on a resident buffer; drop it too.
        if !cache.retry(element) {
            cache.release(element);
        }
        info!(element = %element, "Retrying audio load");
        true
    }

    /// Pause and release every slot. Returns how many were released.
    pub fn shutdown(&mut self, cache: &mut ResourceCache) -> usize {
        let ids: Vec<ElementId> = self.slots.keys().cloned().collect();
        for id in &ids {
            self.release_slot(id, cache);
        }
        self.missing.clear();
        if !ids.is_empty() {
            info!(released = ids.len(), "Audio sync shut down");
        }
        ids.len()
    }
}

fn as_segment<S: Borrow<AudioSegment>>(segment: &S) -> &AudioSegment {
    segment.borrow()
}

// ── Tests ──────────────────────────────────────────────────────────
