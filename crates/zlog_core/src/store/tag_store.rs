//! Tag store: the user's tag palette.
//!
//! # Responsibility
//! - Own the ordered `Tag` collection, starting from the built-in samples.
//! - Validate user-provided tags before they enter the collection.
//!
//! # Invariants
//! - Never persists an empty collection.
//! - Never persists a collection equal to the sample set, so un-customised
//!   defaults do not produce a tag file.
//! - Editing a tag here does not update copies already embedded in dreams.

use super::collection::{Collection, Upsert};
use super::{LoadOutcome, StoreResult};
use crate::model::samples::{is_sample_tag_set, sample_tags};
use crate::model::tag::{Tag, TagId};
use crate::persist::{DocumentStore, PersistResult};
use log::warn;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;

const COLLECTION_NAME: &str = "tags";

fn should_persist(tags: &[Tag]) -> bool {
    !tags.is_empty() && !is_sample_tag_set(tags)
}

/// Single-owner handle to the tag collection.
pub struct TagStore {
    tags: Collection<Tag>,
}

impl TagStore {
    /// Creates a store holding the sample tags (nothing is saved).
    ///
    /// Must be called inside a tokio runtime (the save worker is spawned).
    pub fn new(document: Arc<dyn DocumentStore>) -> PersistResult<Self> {
        Self::with_tags(document, sample_tags().to_vec())
    }

    /// Creates a store holding `tags` without saving them.
    pub fn with_tags(document: Arc<dyn DocumentStore>, tags: Vec<Tag>) -> PersistResult<Self> {
        Ok(Self {
            tags: Collection::new(COLLECTION_NAME, document, tags, should_persist)?,
        })
    }

    pub fn tags(&self) -> &[Tag] {
        self.tags.items()
    }

    pub fn find(&self, id: TagId) -> Option<&Tag> {
        self.tags.items().iter().find(|tag| tag.id == id)
    }

    /// Whether the collection still equals the built-in sample set.
    pub fn is_sample_set(&self) -> bool {
        is_sample_tag_set(self.tags.items())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Tag>>> {
        self.tags.subscribe()
    }

    /// Applies an arbitrary change, then publishes and saves (guards apply).
    pub fn mutate<R>(&mut self, transform: impl FnOnce(&mut Vec<Tag>) -> R) -> R {
        self.tags.mutate(transform)
    }

    /// Loads tags from their document; a missing document yields no tags.
    pub async fn load(&mut self) -> PersistResult<usize> {
        self.tags.load().await
    }

    /// Loads tags, falling back to the sample set on any failure.
    pub async fn load_or_fallback(&mut self) -> LoadOutcome {
        match self.load().await {
            Ok(count) => LoadOutcome::Loaded { count },
            Err(err) => {
                warn!(
                    "event=collection_fallback module=store collection={} fallback=samples error={}",
                    COLLECTION_NAME, err
                );
                let samples = sample_tags().to_vec();
                let count = samples.len();
                self.tags.replace_all(samples);
                LoadOutcome::FellBack {
                    count,
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Appends a validated tag.
    pub fn append(&mut self, tag: Tag) -> StoreResult<()> {
        tag.validate()?;
        self.tags.append(tag);
        Ok(())
    }

    /// Replaces the tag with the same id, or appends it; validates first.
    pub fn upsert(&mut self, tag: Tag) -> StoreResult<Upsert> {
        tag.validate()?;
        Ok(self.tags.upsert(tag))
    }

    pub fn remove_by_id(&mut self, id: TagId) -> bool {
        self.tags.remove_by_id(id)
    }

    pub fn remove_at(&mut self, offsets: &BTreeSet<usize>) -> StoreResult<usize> {
        self.tags.remove_at(offsets)
    }

    /// Reorders tags; the resulting order is persisted.
    pub fn move_items(&mut self, offsets: &BTreeSet<usize>, destination: usize) -> StoreResult<()> {
        self.tags.move_items(offsets, destination)
    }

    pub async fn flush(&self) -> PersistResult<()> {
        self.tags.flush().await
    }
}
