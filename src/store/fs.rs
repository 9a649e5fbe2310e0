//! File-backed stores
//!
//! Sessions live under a root directory, one subdirectory per session id:
//!
//! ```text
//! <root>/<session_id>/session.json     event log (SessionLog)
//! <root>/<session_id>/recording.json   manifest (RecordingManifest)
//! <root>/<session_id>/<manifest.file>  opaque media bytes
//! ```
//!
//! Both stores map missing files and malformed JSON to load errors: a
//! session that cannot be fetched whole fails the whole `open()`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ReplayError, Result};
use crate::session::SessionLog;

use super::{EventLogStore, MediaAsset, MediaHandle, MediaStore};

/// Event log filename inside a session directory
pub const SESSION_LOG_FILE: &str = "session.json";

/// Recording manifest filename inside a session directory
pub const RECORDING_MANIFEST_FILE: &str = "recording.json";

/// On-disk manifest describing a recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingManifest {
    /// Media filename, relative to the session directory
    pub file: String,
    /// MIME type of the recording
    pub mime_type: String,
    /// Recording length in seconds
    pub duration_seconds: f64,
}

/// Event log store reading `session.json` files
#[derive(Debug, Clone)]
pub struct FsEventLogStore {
    root: PathBuf,
}

impl FsEventLogStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id).join(SESSION_LOG_FILE)
    }
}

#[async_trait]
impl EventLogStore for FsEventLogStore {
    async fn get_session(&self, session_id: &str) -> Result<SessionLog> {
        let path = self.session_path(session_id);
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ReplayError::Load(format!("event log for {:?} not found: {}", session_id, e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            ReplayError::Load(format!("event log for {:?} is malformed: {}", session_id, e))
        })
    }
}

/// Media store reading a manifest plus the media file it names
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id)
    }

    async fn read_manifest(&self, dir: &Path, session_id: &str) -> Result<RecordingManifest> {
        let path = dir.join(RECORDING_MANIFEST_FILE);
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ReplayError::Load(format!("recording for {:?} not found: {}", session_id, e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            ReplayError::Load(format!(
                "recording manifest for {:?} is malformed: {}",
                session_id, e
            ))
        })
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn get_recording(&self, session_id: &str) -> Result<MediaHandle> {
        let dir = self.session_dir(session_id);
        let manifest = self.read_manifest(&dir, session_id).await?;

        let media_path = dir.join(&manifest.file);
        let bytes = tokio::fs::read(&media_path).await.map_err(|e| {
            ReplayError::Load(format!(
                "media file {:?} for {:?} not readable: {}",
                manifest.file, session_id, e
            ))
        })?;

        let asset = MediaAsset {
            mime_type: manifest.mime_type,
            declared_duration_seconds: manifest.duration_seconds,
            size_bytes: bytes.len() as u64,
        };

        tracing::debug!(
            session_id,
            size_bytes = asset.size_bytes,
            mime_type = %asset.mime_type,
            "media asset loaded"
        );

        let id = session_id.to_string();
        Ok(MediaHandle::new(asset, bytes).with_release_hook(Box::new(move || {
            tracing::debug!(session_id = %id, "media handle released");
        })))
    }
}
