//! Media Resource Cache — load tracking and handle lifecycle.
//!
//! The cache is the single owner of decoded resources. Callers ask for an
//! element's media with [`acquire`](ResourceCache::acquire), which either
//! returns the resident handle or starts (at most one) load for it. Loads
//! complete through a crossbeam channel and become visible only when the
//! tick loop calls [`poll`](ResourceCache::poll), so evaluation never blocks
//! on a load.
//!
//! In threaded mode a fixed pool of `media-load` workers takes load jobs
//! from a shared queue, so at most that many loads are in flight no matter
//! how many elements are requested at once.
//!
//! Every pending load carries a generation number. A completion whose
//! element was released (or re-requested with a different reference) in
//! the meantime is stale: its payload is destroyed on arrival instead of
//! becoming resident.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use tracing::{debug, info, warn};

use rv_common::{ElementId, LoadMode, MediaRef, ReadinessGate};

use crate::error::LoadError;
use crate::handle::{DecodedMedia, HandleId, ResourceHandle, ResourceKind};
use crate::loader::MediaLoader;

/// Workers started when no count is configured.
pub const DEFAULT_LOAD_WORKERS: usize = 4;

/// Load request queued for the worker pool.
struct Job {
    element: ElementId,
    media: MediaRef,
    kind: ResourceKind,
    generation: u64,
}

/// Load completion, sent from a load worker to the tick loop.
struct Completion {
    element: ElementId,
    generation: u64,
    result: Result<DecodedMedia, LoadError>,
}

enum Entry {
    Pending {
        generation: u64,
        media: MediaRef,
        kind: ResourceKind,
    },
    Ready(ResourceHandle),
    Failed {
        media: MediaRef,
        error: LoadError,
    },
}

impl Entry {
    fn media(&self) -> &MediaRef {
        match self {
            Entry::Pending { media, .. } | Entry::Failed { media, .. } => media,
            Entry::Ready(handle) => &handle.media_ref,
        }
    }
}

/// Outcome of [`ResourceCache::acquire`].
#[derive(Debug)]
pub enum Acquire<'a> {
    Ready(&'a ResourceHandle),
    Pending,
    /// The last load failed; call [`ResourceCache::retry`] to load again.
    Failed(&'a LoadError),
}

/// Lifecycle state of one element, for inspection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Ready,
    Failed,
}

/// What happened to a completion drained by [`ResourceCache::poll`].
#[derive(Clone, Debug, PartialEq)]
pub enum LoadEvent {
    Ready { element: ElementId, handle: HandleId },
    Failed { element: ElementId, error: LoadError },
    /// The element was released or re-requested; the payload was destroyed.
    Discarded { element: ElementId },
}

/// Owned table of decoded media handles keyed by element id.
pub struct ResourceCache {
    loader: Arc<dyn MediaLoader>,
    mode: LoadMode,
    entries: HashMap<ElementId, Entry>,
    next_generation: u64,
    next_handle: u64,
    done_tx: Sender<Completion>,
    done_rx: Receiver<Completion>,
    worker_count: usize,
    /// Started on the first threaded load, joined on shutdown.
    pool: Option<LoadPool>,
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("mode", &self.mode)
            .field("entries", &self.entries.len())
            .field("pending", &self.pending_count())
            .field("workers", &self.pool.as_ref().map_or(0, |pool| pool.workers.len()))
            .finish()
    }
}

impl ResourceCache {
    pub fn new(loader: Arc<dyn MediaLoader>, mode: LoadMode) -> Self {
        Self::with_workers(loader, mode, DEFAULT_LOAD_WORKERS)
    }

    /// Cache whose threaded loads run on at most `workers` threads.
    pub fn with_workers(loader: Arc<dyn MediaLoader>, mode: LoadMode, workers: usize) -> Self {
        let (done_tx, done_rx) = channel::unbounded();
        Self {
            loader,
            mode,
            entries: HashMap::new(),
            next_generation: 0,
            next_handle: 0,
            done_tx,
            done_rx,
            worker_count: workers.max(1),
            pool: None,
        }
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    /// Upper bound on concurrent threaded loads.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Request the decoded media for `element`.
    ///
    /// Idempotent: a resident handle is returned as is, and a second call
    /// while the load is pending never starts a second load. If the element
    /// is already tracked under a different media reference, the old entry
    /// is released and the new reference is loaded.
    pub fn acquire(&mut self, element: &ElementId, media: &MediaRef, kind: ResourceKind) -> Acquire<'_> {
        let same_media = self.entries.get(element).map(|entry| entry.media() == media);
        match same_media {
            Some(true) => {}
            Some(false) => {
                debug!(element = %element, media = %media, "Media reference changed, reloading");
                self.release(element);
                self.start_load(element, media, kind);
            }
            None => self.start_load(element, media, kind),
        }

        match self.entries.get(element) {
            Some(Entry::Ready(handle)) => Acquire::Ready(handle),
            Some(Entry::Failed { error, .. }) => Acquire::Failed(error),
            Some(Entry::Pending { .. }) | None => Acquire::Pending,
        }
    }

    fn start_load(&mut self, element: &ElementId, media: &MediaRef, kind: ResourceKind) {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.entries.insert(
            element.clone(),
            Entry::Pending {
                generation,
                media: media.clone(),
                kind,
            },
        );
        debug!(element = %element, media = %media, %kind, generation, "Starting load");

        match self.mode {
            LoadMode::Inline => self.load_inline(element, media, kind, generation),
            LoadMode::Threaded => self.queue_load(Job {
                element: element.clone(),
                media: media.clone(),
                kind,
                generation,
            }),
        }
    }

    fn queue_load(&mut self, job: Job) {
        if self.pool.is_none() {
            self.pool = LoadPool::spawn(self.worker_count, &self.loader, &self.done_tx);
        }
        if let Some(pool) = &self.pool {
            // The pool holds a receiver, so this cannot fail.
            let _ = pool.job_tx.send(job);
            return;
        }
        warn!(element = %job.element, "No load workers available, loading inline");
        self.load_inline(&job.element, &job.media, job.kind, job.generation);
    }

    fn load_inline(&mut self, element: &ElementId, media: &MediaRef, kind: ResourceKind, generation: u64) {
        let result = self.loader.load(media, kind);
        // We hold the receiver, so this cannot fail.
        let _ = self.done_tx.send(Completion {
            element: element.clone(),
            generation,
            result,
        });
    }

    /// Drain finished loads without blocking and apply them to the table.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        loop {
            match self.done_rx.try_recv() {
                Ok(completion) => events.push(self.complete(completion)),
                Err(TryRecvError::Empty) => break,
                // Unreachable while we hold a sender.
                Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    fn complete(&mut self, completion: Completion) -> LoadEvent {
        let Completion {
            element,
            generation,
            result,
        } = completion;

        let current = match self.entries.get(&element) {
            Some(Entry::Pending {
                generation: expected,
                media,
                kind,
            }) if *expected == generation => Some((media.clone(), *kind)),
            _ => None,
        };

        let Some((media_ref, kind)) = current else {
            debug!(element = %element, generation, "Discarding stale load completion");
            if let Ok(media) = result {
                self.loader.destroy(media);
            }
            return LoadEvent::Discarded { element };
        };

        match result {
            Ok(media) => {
                self.next_handle += 1;
                let id = HandleId(self.next_handle);
                info!(
                    element = %element,
                    media = %media_ref,
                    handle = %id,
                    bytes = media.byte_len(),
                    "Resource ready"
                );
                self.entries.insert(
                    element.clone(),
                    Entry::Ready(ResourceHandle {
                        id,
                        element: element.clone(),
                        media_ref,
                        kind,
                        media,
                    }),
                );
                LoadEvent::Ready {
                    element,
                    handle: id,
                }
            }
            Err(error) => {
                warn!(element = %element, error = %error, "Resource load failed");
                self.entries.insert(
                    element.clone(),
                    Entry::Failed {
                        media: media_ref,
                        error: error.clone(),
                    },
                );
                LoadEvent::Failed { element, error }
            }
        }
    }

    /// Destroy the element's resource and forget it.
    ///
    /// An in-flight load is discarded when it completes. Returns `false`
    /// (and does nothing) if the element was never acquired.
    pub fn release(&mut self, element: &ElementId) -> bool {
        match self.entries.remove(element) {
            Some(Entry::Ready(handle)) => {
                info!(element = %element, handle = %handle.id, "Releasing resource");
                self.loader.destroy(handle.media);
                true
            }
            Some(Entry::Pending { generation, .. }) => {
                debug!(element = %element, generation, "Released while loading");
                true
            }
            Some(Entry::Failed { .. }) => true,
            None => false,
        }
    }

    /// Forget a failed load so the next `acquire` loads again.
    ///
    /// Returns `true` if the element was in the failed state.
    pub fn retry(&mut self, element: &ElementId) -> bool {
        if matches!(self.entries.get(element), Some(Entry::Failed { .. })) {
            self.entries.remove(element);
            return true;
        }
        false
    }

    /// Release every element not in `keep`. Returns how many were released.
    pub fn retain(&mut self, keep: &HashSet<ElementId>) -> usize {
        let stale: Vec<ElementId> = self
            .entries
            .keys()
            .filter(|id| !keep.contains(*id))
            .cloned()
            .collect();
        for id in &stale {
            self.release(id);
        }
        stale.len()
    }

    /// Release every tracked element.
    pub fn release_all(&mut self) -> usize {
        let ids: Vec<ElementId> = self.entries.keys().cloned().collect();
        for id in &ids {
            self.release(id);
        }
        ids.len()
    }

    /// Release everything, wait for in-flight loads and destroy their payloads.
    ///
    /// Queued loads no worker has picked up yet are dropped unstarted.
    pub fn shutdown(&mut self) {
        let released = self.release_all();
        let (skipped, joined) = match self.pool.take() {
            Some(pool) => pool.shutdown(),
            None => (0, 0),
        };
        // Everything left in the channel is stale now.
        let drained = self.poll().len();
        if released + skipped + joined + drained > 0 {
            info!(released, skipped, joined, drained, "Resource cache shut down");
        }
    }

    pub fn get(&self, element: &ElementId) -> Option<&ResourceHandle> {
        match self.entries.get(element) {
            Some(Entry::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn is_ready(&self, element: &ElementId) -> bool {
        self.get(element).is_some()
    }

    pub fn state(&self, element: &ElementId) -> Option<EntryState> {
        self.entries.get(element).map(|entry| match entry {
            Entry::Pending { .. } => EntryState::Pending,
            Entry::Ready(_) => EntryState::Ready,
            Entry::Failed { .. } => EntryState::Failed,
        })
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, Entry::Pending { .. }))
            .count()
    }

    pub fn ready_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, Entry::Ready(_)))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReadinessGate for ResourceCache {
    fn is_ready(&self, id: &ElementId) -> bool {
        ResourceCache::is_ready(self, id)
    }
}

impl Drop for ResourceCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Fixed set of `media-load` threads sharing one job queue.
struct LoadPool {
    job_tx: Sender<Job>,
    /// Kept so shutdown can drop jobs nobody started.
    job_rx: Receiver<Job>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl LoadPool {
    /// Start up to `count` workers. `None` if not a single one could start.
    fn spawn(count: usize, loader: &Arc<dyn MediaLoader>, done_tx: &Sender<Completion>) -> Option<Self> {
        let (job_tx, job_rx) = channel::unbounded::<Job>();
        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            let loader = Arc::clone(loader);
            let jobs = job_rx.clone();
            let done = done_tx.clone();
            let spawned = thread::Builder::new()
                .name("media-load".to_string())
                .spawn(move || run_worker(loader, jobs, done));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    warn!(worker = index, error = %e, "Failed to spawn load worker");
                    break;
                }
            }
        }
        if workers.is_empty() {
            return None;
        }
        info!(workers = workers.len(), "Load workers started");
        Some(Self {
            job_tx,
            job_rx,
            workers,
        })
    }

    /// Close the queue and join every worker. Returns (skipped jobs, joined workers).
    fn shutdown(self) -> (usize, usize) {
        let LoadPool {
            job_tx,
            job_rx,
            workers,
        } = self;
        drop(job_tx);
        let skipped = job_rx.try_iter().count();
        let joined = workers.len();
        for worker in workers {
            if worker.join().is_err() {
                warn!("Load worker panicked");
            }
        }
        (skipped, joined)
    }
}

/// Worker loop: runs until the job queue closes.
fn run_worker(loader: Arc<dyn MediaLoader>, jobs: Receiver<Job>, done: Sender<Completion>) {
    for job in jobs.iter() {
        let result = loader.load(&job.media, job.kind);
        let completion = Completion {
            element: job.element,
            generation: job.generation,
            result,
        };
        // The cache is gone; nobody else will destroy the payload.
        if let Err(channel::SendError(lost)) = done.send(completion) {
            if let Ok(media) = lost.result {
                loader.destroy(media);
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Loader that records every call; references starting with `bad` fail.
    #[derive(Default)]
    struct RecordingLoader {
        loads: Mutex<Vec<String>>,
        destroyed: Mutex<Vec<DecodedMedia>>,
    }

    impl MediaLoader for RecordingLoader {
        fn load(&self, media: &MediaRef, _kind: ResourceKind) -> Result<DecodedMedia, LoadError> {
            self.loads.lock().push(media.to_string());
            if media.as_str().starts_with("bad") {
                return Err(LoadError::Decode {
                    media: media.to_string(),
                    reason: "corrupt".into(),
                });
            }
            Ok(DecodedMedia::Stream {
                bytes: media.as_str().as_bytes().to_vec(),
            })
        }

        fn destroy(&self, media: DecodedMedia) {
            self.destroyed.lock().push(media);
        }
    }

    fn inline_cache() -> (Arc<RecordingLoader>, ResourceCache) {
        let loader = Arc::new(RecordingLoader::default());
        let cache = ResourceCache::new(loader.clone(), LoadMode::Inline);
        (loader, cache)
    }

    fn id(s: &str) -> ElementId {
        ElementId::new(s)
    }

    #[test]
    fn double_acquire_loads_once() {
        let (loader, mut cache) = inline_cache();
        let media = MediaRef::new("a.mp4");
        assert!(matches!(cache.acquire(&id("a"), &media, ResourceKind::Video), Acquire::Pending));
        assert!(matches!(cache.acquire(&id("a"), &media, ResourceKind::Video), Acquire::Pending));
        assert_eq!(loader.loads.lock().len(), 1);
        assert_eq!(cache.pending_count(), 1);
        assert!(!cache.is_ready(&id("a")));

        let events = cache.poll();
        assert!(matches!(events.as_slice(), [LoadEvent::Ready { .. }]));
        match cache.acquire(&id("a"), &media, ResourceKind::Video) {
            Acquire::Ready(handle) => assert_eq!(handle.media_ref, media),
            other => panic!("expected ready, got {other:?}"),
        }
        assert_eq!(loader.loads.lock().len(), 1);
    }

    #[test]
    fn release_destroys_exactly_once() {
        let (loader, mut cache) = inline_cache();
        cache.acquire(&id("a"), &MediaRef::new("a.png"), ResourceKind::Image);
        cache.poll();
        assert!(cache.release(&id("a")));
        assert!(!cache.release(&id("a")));
        assert!(!cache.release(&id("never")));
        assert_eq!(loader.destroyed.lock().len(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn destroy_receives_the_loaded_payload() {
        let (loader, mut cache) = inline_cache();
        cache.acquire(&id("a"), &MediaRef::new("a.png"), ResourceKind::Image);
        cache.poll();
        cache.release(&id("a"));
        assert_eq!(
            loader.destroyed.lock().as_slice(),
            [DecodedMedia::Stream {
                bytes: b"a.png".to_vec()
            }]
        );
    }

    #[test]
    fn completion_for_released_id_is_discarded() {
        let (loader, mut cache) = inline_cache();
        cache.acquire(&id("a"), &MediaRef::new("a.png"), ResourceKind::Image);
        cache.release(&id("a"));

        let events = cache.poll();
        assert_eq!(events, vec![LoadEvent::Discarded { element: id("a") }]);
        assert!(!cache.is_ready(&id("a")));
        assert_eq!(loader.destroyed.lock().len(), 1);
    }

    #[test]
    fn changed_reference_supersedes_pending_load() {
        let (loader, mut cache) = inline_cache();
        cache.acquire(&id("a"), &MediaRef::new("old.png"), ResourceKind::Image);
        cache.acquire(&id("a"), &MediaRef::new("new.png"), ResourceKind::Image);

        let events = cache.poll();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], LoadEvent::Discarded { element: id("a") });
        assert_eq!(cache.get(&id("a")).unwrap().media_ref, MediaRef::new("new.png"));
        assert_eq!(loader.destroyed.lock().len(), 1);
    }

    #[test]
    fn failure_sticks_until_retry() {
        let (loader, mut cache) = inline_cache();
        let media = MediaRef::new("bad.mp3");
        cache.acquire(&id("s"), &media, ResourceKind::Audio);
        let events = cache.poll();
        assert!(matches!(events.as_slice(), [LoadEvent::Failed { .. }]));
        assert_eq!(cache.state(&id("s")), Some(EntryState::Failed));

        match cache.acquire(&id("s"), &media, ResourceKind::Audio) {
            Acquire::Failed(error) => assert!(error.to_string().contains("bad.mp3")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(loader.loads.lock().len(), 1);

        assert!(cache.retry(&id("s")));
        assert!(matches!(cache.acquire(&id("s"), &media, ResourceKind::Audio), Acquire::Pending));
        assert_eq!(loader.loads.lock().len(), 2);
    }

    #[test]
    fn retain_releases_unreferenced() {
        let (loader, mut cache) = inline_cache();
        for name in ["a", "b", "c"] {
            cache.acquire(&id(name), &MediaRef::new(format!("{name}.png")), ResourceKind::Image);
        }
        cache.poll();
        let keep: HashSet<ElementId> = [id("b")].into_iter().collect();
        assert_eq!(cache.retain(&keep), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.is_ready(&id("b")));
        assert_eq!(loader.destroyed.lock().len(), 2);
    }

    #[test]
    fn drop_releases_everything() {
        let loader = Arc::new(RecordingLoader::default());
        {
            let mut cache = ResourceCache::new(loader.clone(), LoadMode::Inline);
            cache.acquire(&id("a"), &MediaRef::new("a.png"), ResourceKind::Image);
            cache.poll();
            cache.acquire(&id("b"), &MediaRef::new("b.png"), ResourceKind::Image);
        }
        // `a` was resident, `b` was still in the channel.
        assert_eq!(loader.destroyed.lock().len(), 2);
    }
}
