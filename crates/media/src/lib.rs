//! `rv-media` — Media resource cache for the reelview preview core.
//!
//! - **Cache**: [`ResourceCache`] owns every decoded handle, with idempotent
//!   acquisition, non-blocking completion polling and explicit release
//! - **Loader**: the [`MediaLoader`] seam plus a filesystem implementation
//! - **Handles**: [`ResourceHandle`], [`DecodedMedia`], [`ResourceKind`]
//!
//! Loads run on a fixed worker pool ([`LoadMode::Threaded`](rv_common::LoadMode))
//! or synchronously at request time ([`LoadMode::Inline`](rv_common::LoadMode)).
//! Either way a completion is only observed at the next [`ResourceCache::poll`].

pub mod cache;
pub mod error;
pub mod handle;
pub mod loader;

pub use cache::{Acquire, EntryState, LoadEvent, ResourceCache, DEFAULT_LOAD_WORKERS};
pub use error::{LoadError, LoadResult};
pub use handle::{DecodedMedia, HandleId, ResourceHandle, ResourceKind};
pub use loader::{FsLoader, MediaLoader};
