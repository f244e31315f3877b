//! Authoritative in-memory collections with save-on-change.
//!
//! # Responsibility
//! - Own the sleep and tag collections for the running app.
//! - Expose the mutation API used by the presentation layer and sync client.
//! - Publish snapshots to subscribers and schedule background saves.
//!
//! # Invariants
//! - Each store has a single owner; mutations take `&mut self`.
//! - An empty collection is never persisted.
//! - The tag store also never persists the untouched sample set.
//! - A failed mutation (bad index, unknown id, invalid input) changes nothing
//!   and schedules nothing.

mod collection;
pub mod sleep_store;
pub mod tag_store;

pub use collection::{move_elements, remove_elements, Upsert};

use crate::model::sleep::SleepId;
use crate::model::tag::TagValidationError;
use crate::persist::PersistError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level mutation or load failure.
#[derive(Debug)]
pub enum StoreError {
    IndexOutOfRange { index: usize, len: usize },
    SleepNotFound(SleepId),
    InvalidTag(TagValidationError),
    Persist(PersistError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for {len} entries")
            }
            Self::SleepNotFound(id) => write!(f, "sleep not found: {id}"),
            Self::InvalidTag(err) => write!(f, "{err}"),
            Self::Persist(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTag(err) => Some(err),
            Self::Persist(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TagValidationError> for StoreError {
    fn from(value: TagValidationError) -> Self {
        Self::InvalidTag(value)
    }
}

impl From<PersistError> for StoreError {
    fn from(value: PersistError) -> Self {
        Self::Persist(value)
    }
}

/// Result of `load_or_fallback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Document read (or absent); collection holds `count` entries.
    Loaded { count: usize },
    /// Document unreadable; collection replaced by the store's fallback.
    FellBack { count: usize, reason: String },
}
