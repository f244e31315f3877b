//! Durable persistence adapter for whole-collection documents.
//!
//! # Responsibility
//! - Define the byte-level storage contract used by both stores.
//! - Provide file-backed and in-memory implementations.
//! - Run out-of-band saves through a per-collection coalescing queue.
//!
//! # Invariants
//! - A missing document is not an error: `read` returns `Ok(None)`.
//! - Writes always replace the whole document; there are no partial writes.

mod file;
mod memory;
mod save_queue;

pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;
pub use save_queue::{SaveProgress, SaveQueue};

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistResult<T> = Result<T, PersistError>;

/// Byte storage for exactly one collection document.
///
/// Implementations are called from blocking worker threads, never from the
/// async executor directly.
pub trait DocumentStore: Send + Sync {
    /// Human-readable location used in logs and error messages.
    fn location(&self) -> String;

    /// Returns the full document, or `None` when nothing was saved yet.
    fn read(&self) -> PersistResult<Option<Vec<u8>>>;

    /// Replaces the full document.
    fn write(&self, bytes: &[u8]) -> PersistResult<()>;
}

/// Persistence-layer failure.
#[derive(Debug)]
pub enum PersistError {
    /// Reading or writing the backing storage failed.
    Io {
        location: String,
        source: std::io::Error,
    },
    /// Stored document is not a valid collection.
    Decode(serde_json::Error),
    /// Collection could not be serialized.
    Encode(serde_json::Error),
    /// Background task could not run or was cancelled.
    Task(String),
    /// Most recent background save failed.
    Save(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { location, source } => write!(f, "storage error at `{location}`: {source}"),
            Self::Decode(err) => write!(f, "saved data could not be read: {err}"),
            Self::Encode(err) => write!(f, "data could not be encoded for saving: {err}"),
            Self::Task(message) => write!(f, "background storage task failed: {message}"),
            Self::Save(message) => write!(f, "latest save failed: {message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode(err) | Self::Encode(err) => Some(err),
            Self::Task(_) | Self::Save(_) => None,
        }
    }
}

impl From<tokio::task::JoinError> for PersistError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Task(value.to_string())
    }
}
