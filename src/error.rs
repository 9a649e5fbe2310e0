//! Error handling for the replay engine
//!
//! This module defines custom error types and a Result alias for use
//! throughout the crate.

use thiserror::Error;

/// Main error type for replay operations
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Event log could not be trusted: unparsable timestamps or an order
    /// that decreases after normalization
    #[error("Session data error: {0}")]
    Data(String),

    /// Event log or media asset could not be fetched
    #[error("Load error: {0}")]
    Load(String),

    /// Decode/playback failure reported by the external media player
    #[error("Playback error: {0}")]
    Playback(String),

    /// An event index outside the loaded timeline was passed to a seek
    #[error("Event index {index} out of range (timeline has {len} events)")]
    OutOfRange { index: usize, len: usize },

    /// Operation attempted on an engine that has already closed
    #[error("Engine is closed")]
    Closed,

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ReplayError>,
    },
}

impl ReplayError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ReplayError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for replay operations
pub type Result<T> = std::result::Result<T, ReplayError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
