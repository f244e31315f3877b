//! Record store: the sleep journal and the dreams it owns.
//!
//! # Responsibility
//! - Own the ordered `Sleep` collection and its mutation API.
//! - Reconcile remote share results (`mark_uploaded`).
//!
//! # Invariants
//! - Persisted whenever a mutation leaves the journal non-empty.
//! - No sample-set guard (unlike the tag store).
//! - On load failure the caller policy falls back to an empty journal,
//!   which is never persisted, so an unreadable file is not overwritten.

use super::collection::{Collection, Upsert};
use super::{LoadOutcome, StoreError, StoreResult};
use crate::model::dream::{Dream, DreamId};
use crate::model::sleep::{Sleep, SleepId};
use crate::persist::{DocumentStore, PersistResult};
use chrono_tz::Tz;
use log::{info, warn};
use rand::seq::IteratorRandom;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;

const COLLECTION_NAME: &str = "sleeps";

fn should_persist(sleeps: &[Sleep]) -> bool {
    !sleeps.is_empty()
}

/// Single-owner handle to the sleep journal.
pub struct SleepStore {
    sleeps: Collection<Sleep>,
}

impl SleepStore {
    /// Creates an empty journal backed by `document`.
    ///
    /// Must be called inside a tokio runtime (the save worker is spawned).
    pub fn new(document: Arc<dyn DocumentStore>) -> PersistResult<Self> {
        Self::with_sleeps(document, Vec::new())
    }

    /// Creates a journal holding `sleeps` without saving them.
    pub fn with_sleeps(document: Arc<dyn DocumentStore>, sleeps: Vec<Sleep>) -> PersistResult<Self> {
        Ok(Self {
            sleeps: Collection::new(COLLECTION_NAME, document, sleeps, should_persist)?,
        })
    }

    pub fn sleeps(&self) -> &[Sleep] {
        self.sleeps.items()
    }

    pub fn len(&self) -> usize {
        self.sleeps.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sleeps.items().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sleep> {
        self.sleeps.items().get(index)
    }

    pub fn find(&self, id: SleepId) -> Option<&Sleep> {
        self.sleeps.items().iter().find(|sleep| sleep.id == id)
    }

    /// Receives a snapshot after every committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Sleep>>> {
        self.sleeps.subscribe()
    }

    /// Applies an arbitrary change to the journal, then publishes and saves.
    pub fn mutate<R>(&mut self, transform: impl FnOnce(&mut Vec<Sleep>) -> R) -> R {
        self.sleeps.mutate(transform)
    }

    /// Loads the journal from its document.
    ///
    /// # Errors
    /// - `PersistError::Decode` when the document is malformed; the journal
    ///   is left unchanged.
    /// - `PersistError::Io` when the document exists but cannot be read.
    pub async fn load(&mut self) -> PersistResult<usize> {
        self.sleeps.load().await
    }

    /// Loads the journal, falling back to an empty journal on any failure.
    pub async fn load_or_fallback(&mut self) -> LoadOutcome {
        match self.load().await {
            Ok(count) => LoadOutcome::Loaded { count },
            Err(err) => {
                warn!(
                    "event=collection_fallback module=store collection={} fallback=empty error={}",
                    COLLECTION_NAME, err
                );
                self.sleeps.replace_all(Vec::new());
                LoadOutcome::FellBack {
                    count: 0,
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Appends a new empty sleep recorded now; returns its id.
    pub fn add_sleep(&mut self, time_zone: Tz) -> SleepId {
        let sleep = Sleep::new(time_zone);
        let id = sleep.id;
        self.sleeps.append(sleep);
        id
    }

    pub fn append(&mut self, sleep: Sleep) {
        self.sleeps.append(sleep);
    }

    /// Replaces the sleep with the same id, or appends it.
    pub fn upsert(&mut self, sleep: Sleep) -> Upsert {
        self.sleeps.upsert(sleep)
    }

    /// Deletes a sleep and, with it, every dream it owns.
    pub fn remove_by_id(&mut self, id: SleepId) -> bool {
        self.sleeps.remove_by_id(id)
    }

    pub fn remove_at(&mut self, offsets: &BTreeSet<usize>) -> StoreResult<usize> {
        self.sleeps.remove_at(offsets)
    }

    pub fn move_items(&mut self, offsets: &BTreeSet<usize>, destination: usize) -> StoreResult<()> {
        self.sleeps.move_items(offsets, destination)
    }

    /// Edits the sleep at `index` in place (notes, date, zone, dreams).
    pub fn edit_sleep<R>(&mut self, index: usize, edit: impl FnOnce(&mut Sleep) -> R) -> StoreResult<R> {
        self.sleeps.try_mutate(|sleeps| {
            let len = sleeps.len();
            sleeps
                .get_mut(index)
                .map(edit)
                .ok_or(StoreError::IndexOutOfRange { index, len })
        })
    }

    /// Replaces the dream with the same id inside `sleep_id`, or appends it.
    pub fn upsert_dream(&mut self, sleep_id: SleepId, dream: Dream) -> StoreResult<Upsert> {
        self.sleeps.try_mutate(|sleeps| {
            let sleep = sleeps
                .iter_mut()
                .find(|sleep| sleep.id == sleep_id)
                .ok_or(StoreError::SleepNotFound(sleep_id))?;
            match sleep.dreams.iter_mut().find(|existing| existing.id == dream.id) {
                Some(existing) => {
                    *existing = dream;
                    Ok(Upsert::Replaced)
                }
                None => {
                    sleep.dreams.push(dream);
                    Ok(Upsert::Inserted)
                }
            }
        })
    }

    /// Removes a dream from one sleep; returns whether it was present.
    pub fn remove_dream(&mut self, sleep_id: SleepId, dream_id: DreamId) -> StoreResult<bool> {
        let sleep = self.find(sleep_id).ok_or(StoreError::SleepNotFound(sleep_id))?;
        if sleep.dream(dream_id).is_none() {
            return Ok(false);
        }
        self.sleeps.mutate(|sleeps| {
            if let Some(sleep) = sleeps.iter_mut().find(|sleep| sleep.id == sleep_id) {
                sleep.dreams.retain(|dream| dream.id != dream_id);
            }
        });
        Ok(true)
    }

    /// Sets `is_uploaded` on every copy of `dream_id` across all sleeps.
    ///
    /// Returns the number of copies found. Nothing is committed when the id
    /// does not occur in the journal.
    pub fn mark_uploaded(&mut self, dream_id: DreamId) -> usize {
        let occurrences = self.all_dreams().filter(|dream| dream.id == dream_id).count();
        if occurrences == 0 {
            warn!("event=mark_uploaded module=store status=miss dream_id={dream_id}");
            return 0;
        }
        self.sleeps.mutate(|sleeps| {
            sleeps
                .iter_mut()
                .flat_map(|sleep| sleep.dreams.iter_mut())
                .filter(|dream| dream.id == dream_id)
                .for_each(|dream| dream.is_uploaded = true);
        });
        info!("event=mark_uploaded module=store status=ok dream_id={dream_id} occurrences={occurrences}");
        occurrences
    }

    /// Every dream of every sleep, in journal order.
    pub fn all_dreams(&self) -> impl Iterator<Item = &Dream> {
        self.sleeps.items().iter().flat_map(|sleep| sleep.dreams.iter())
    }

    /// Uniformly random local dream; `None` when the journal has no dreams.
    pub fn random_dream(&self) -> Option<Dream> {
        self.all_dreams().choose(&mut rand::thread_rng()).cloned()
    }

    /// Waits for the latest scheduled save to be attempted.
    pub async fn flush(&self) -> PersistResult<()> {
        self.sleeps.flush().await
    }
}
