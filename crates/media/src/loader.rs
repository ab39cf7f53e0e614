//! The loader seam: turning a media reference into a decoded resource.

use std::path::{Path, PathBuf};

use rv_common::MediaRef;
use tracing::debug;

use crate::error::{LoadError, LoadResult};
use crate::handle::{DecodedMedia, ResourceKind};

/// External collaborator that resolves and decodes media.
///
/// `load` may block; the cache calls it from worker threads in threaded mode.
/// `destroy` is called exactly once for every payload `load` returned.
pub trait MediaLoader: Send + Sync {
    fn load(&self, media: &MediaRef, kind: ResourceKind) -> LoadResult<DecodedMedia>;

    fn destroy(&self, media: DecodedMedia) {
        drop(media);
    }
}

/// Loads media references as file paths relative to a root directory.
///
/// Produces raw [`DecodedMedia::Stream`] bytes; remote references are unsupported.
#[derive(Clone, Debug)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, media: &MediaRef) -> LoadResult<PathBuf> {
        let location = media.as_str().trim();
        if location.contains("://") {
            return Err(LoadError::Unsupported {
                media: location.to_string(),
                reason: "remote references are not resolved locally".into(),
            });
        }
        Ok(self.root.join(location))
    }
}

impl MediaLoader for FsLoader {
    fn load(&self, media: &MediaRef, kind: ResourceKind) -> LoadResult<DecodedMedia> {
        let path = self.resolve(media)?;
        let bytes = std::fs::read(&path).map_err(|e| LoadError::io(media.as_str(), &e))?;
        debug!(path = %path.display(), %kind, bytes = bytes.len(), "Loaded media file");
        Ok(DecodedMedia::Stream { bytes })
    }
}
