//! External store interfaces
//!
//! The engine is a read-only consumer of two collaborators: an event log
//! store (the session's conversation/evaluation turns) and a media store
//! (the opaque recording asset). Both are async trait seams so hosts can
//! plug in whatever backs them; [`fs`] provides file-backed implementations
//! for the demo binary and integration tests.
//!
//! The media asset is wrapped in a [`MediaHandle`] that runs its release
//! hook exactly once when the handle is dropped, on every exit path of the
//! engine; handing the asset around by value makes a leaked or
//! double-released handle unrepresentable.

pub mod fs;

pub use fs::{FsEventLogStore, FsMediaStore};

use async_trait::async_trait;

use crate::error::Result;
use crate::session::SessionLog;

/// Metadata for a stored recording
#[derive(Debug, Clone)]
pub struct MediaAsset {
    /// MIME type of the recording
    pub mime_type: String,
    /// Duration recorded alongside the asset, in seconds
    ///
    /// Used when the player cannot report a finite native duration.
    pub declared_duration_seconds: f64,
    /// Size of the asset in bytes
    pub size_bytes: u64,
}

/// Exclusively-owned media resource
///
/// Holds the opaque asset bytes for the session's lifetime. The release
/// hook (if any) runs exactly once, when the handle is dropped.
pub struct MediaHandle {
    asset: MediaAsset,
    bytes: Vec<u8>,
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl MediaHandle {
    /// Wrap an asset and its bytes
    pub fn new(asset: MediaAsset, bytes: Vec<u8>) -> Self {
        Self {
            asset,
            bytes,
            on_release: None,
        }
    }

    /// Attach a hook to run when the handle is released
    pub fn with_release_hook(mut self, hook: Box<dyn FnOnce() + Send>) -> Self {
        self.on_release = Some(hook);
        self
    }

    /// Asset metadata
    pub fn asset(&self) -> &MediaAsset {
        &self.asset
    }

    /// The opaque asset bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaHandle")
            .field("asset", &self.asset)
            .field("bytes", &self.bytes.len())
            .field("has_release_hook", &self.on_release.is_some())
            .finish()
    }
}

impl Drop for MediaHandle {
    fn drop(&mut self) {
        if let Some(hook) = self.on_release.take() {
            hook();
        }
    }
}

/// Source of session event logs
#[async_trait]
pub trait EventLogStore: Send + Sync {
    /// Fetch the event log for a session
    ///
    /// Fails with a load error when the session is unknown or the fetch
    /// fails.
    async fn get_session(&self, session_id: &str) -> Result<SessionLog>;
}

/// Source of recorded media assets
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Fetch the recording for a session
    ///
    /// Fails with a load error when the recording is unknown or the fetch
    /// fails.
    async fn get_recording(&self, session_id: &str) -> Result<MediaHandle>;
}
