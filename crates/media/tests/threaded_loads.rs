//! Integration tests for the resource cache running its load worker pool.
//!
//! The loader blocks on a gate so the tests control exactly when a load
//! finishes relative to `acquire`, `release` and `poll`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use rv_common::{ElementId, LoadMode, MediaRef};
use rv_media::{Acquire, DecodedMedia, LoadError, LoadEvent, MediaLoader, ResourceCache, ResourceKind};

// ---------------------------------------------------------------------------
// Helper: a loader whose loads finish only when the test says so
// ---------------------------------------------------------------------------

struct GatedLoader {
    release_rx: Receiver<()>,
    loads: Mutex<u32>,
    destroyed: Mutex<u32>,
    in_flight: Mutex<u32>,
    /// Most loads ever blocked in `load` at the same time.
    peak: Mutex<u32>,
}

impl GatedLoader {
    fn new() -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = channel::unbounded();
        let loader = Arc::new(Self {
            release_rx: rx,
            loads: Mutex::new(0),
            destroyed: Mutex::new(0),
            in_flight: Mutex::new(0),
            peak: Mutex::new(0),
        });
        (loader, tx)
    }
}

impl MediaLoader for GatedLoader {
    fn load(&self, media: &MediaRef, _kind: ResourceKind) -> Result<DecodedMedia, LoadError> {
        *self.loads.lock() += 1;
        {
            let mut in_flight = self.in_flight.lock();
            *in_flight += 1;
            let mut peak = self.peak.lock();
            *peak = (*peak).max(*in_flight);
        }
        let gate = self.release_rx.recv_timeout(Duration::from_secs(5));
        *self.in_flight.lock() -= 1;
        gate.map_err(|_| LoadError::Cancelled {
            media: media.to_string(),
        })?;
        Ok(DecodedMedia::AudioBuffer {
            token: 7,
            sample_rate: 48_000,
            channels: 2,
            duration: rv_common::TimeCode::from_secs(3.0),
        })
    }

    fn destroy(&self, _media: DecodedMedia) {
        *self.destroyed.lock() += 1;
    }
}

/// Poll until at least one event arrives or the deadline passes.
fn poll_until_event(cache: &mut ResourceCache) -> Vec<LoadEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let events = cache.poll();
        if !events.is_empty() || Instant::now() > deadline {
            return events;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
}

/// Spin until `done` holds or the deadline passes.
fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        if Instant::now() > deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn acquire_while_loading_starts_one_load() {
    let (loader, gate) = GatedLoader::new();
    let mut cache = ResourceCache::new(loader.clone(), LoadMode::Threaded);
    let id = ElementId::new("music");
    let media = MediaRef::new("music.mp3");

    assert!(matches!(cache.acquire(&id, &media, ResourceKind::Audio), Acquire::Pending));
    assert!(matches!(cache.acquire(&id, &media, ResourceKind::Audio), Acquire::Pending));
    assert!(cache.poll().is_empty());
    assert!(!cache.is_ready(&id));

    gate.send(()).unwrap();
    let events = poll_until_event(&mut cache);
    assert!(matches!(events.as_slice(), [LoadEvent::Ready { .. }]));
    assert!(cache.is_ready(&id));
    assert_eq!(*loader.loads.lock(), 1);
}

#[test]
fn release_during_load_discards_completion() {
    let (loader, gate) = GatedLoader::new();
    let mut cache = ResourceCache::new(loader.clone(), LoadMode::Threaded);
    let id = ElementId::new("clip");

    cache.acquire(&id, &MediaRef::new("clip.mp4"), ResourceKind::Video);
    assert!(cache.release(&id));
    gate.send(()).unwrap();

    let events = poll_until_event(&mut cache);
    assert_eq!(events, vec![LoadEvent::Discarded { element: id.clone() }]);
    assert!(cache.get(&id).is_none());
    assert_eq!(*loader.destroyed.lock(), 1);
}

#[test]
fn shutdown_waits_for_in_flight_loads() {
    let (loader, gate) = GatedLoader::new();
    let mut cache = ResourceCache::new(loader.clone(), LoadMode::Threaded);
    cache.acquire(&ElementId::new("a"), &MediaRef::new("a.mp3"), ResourceKind::Audio);
    cache.acquire(&ElementId::new("b"), &MediaRef::new("b.mp3"), ResourceKind::Audio);
    assert!(wait_until(|| *loader.loads.lock() == 2));

    gate.send(()).unwrap();
    gate.send(()).unwrap();
    cache.shutdown();

    assert_eq!(*loader.loads.lock(), 2);
    assert_eq!(*loader.destroyed.lock(), 2);
    assert!(cache.is_empty());
}

#[test]
fn worker_pool_caps_in_flight_loads() {
    let (loader, gate) = GatedLoader::new();
    let mut cache = ResourceCache::with_workers(loader.clone(), LoadMode::Threaded, 2);
    assert_eq!(cache.worker_count(), 2);
    for i in 0..6 {
        let id = ElementId::new(format!("clip{i}"));
        let media = MediaRef::new(format!("clip{i}.mp4"));
        assert!(matches!(cache.acquire(&id, &media, ResourceKind::Video), Acquire::Pending));
    }

    assert!(wait_until(|| *loader.loads.lock() == 2));
    // A third thread would have started a load by now.
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(*loader.loads.lock(), 2);
    assert_eq!(*loader.peak.lock(), 2);

    for _ in 0..6 {
        gate.send(()).unwrap();
    }
    let mut ready = 0;
    assert!(wait_until(|| {
        ready += cache
            .poll()
            .iter()
            .filter(|event| matches!(event, LoadEvent::Ready { .. }))
            .count();
        ready == 6
    }));
    assert_eq!(*loader.loads.lock(), 6);
    assert_eq!(*loader.peak.lock(), 2);
    assert_eq!(cache.pending_count(), 0);
}

#[test]
fn shutdown_drops_queued_loads_unstarted() {
    let (loader, gate) = GatedLoader::new();
    let mut cache = ResourceCache::with_workers(loader.clone(), LoadMode::Threaded, 1);
    for name in ["a", "b", "c"] {
        cache.acquire(&ElementId::new(name), &MediaRef::new(format!("{name}.mp3")), ResourceKind::Audio);
    }
    assert!(wait_until(|| *loader.loads.lock() == 1));

    // Open the gate only once shutdown has closed the queue.
    let opener = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        gate.send(()).unwrap();
    });
    cache.shutdown();
    opener.join().unwrap();

    // Only the load already running finished; its payload was destroyed.
    assert_eq!(*loader.loads.lock(), 1);
    assert_eq!(*loader.destroyed.lock(), 1);
    assert!(cache.is_empty());
}
