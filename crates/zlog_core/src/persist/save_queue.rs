//! Per-collection background save queue.
//!
//! # Responsibility
//! - Persist collection snapshots without blocking the mutating caller.
//! - Serialize saves for one collection and coalesce bursts.
//!
//! # Invariants
//! - At most one save per collection is in flight.
//! - The queue holds at most one pending snapshot; a newer snapshot replaces
//!   an older one that has not started yet (latest state wins).
//! - A failed save is logged and reported through `SaveProgress`; it never
//!   touches in-memory state.

use super::{DocumentStore, PersistError, PersistResult};
use crate::codec::encode_collection;
use log::{debug, error, info};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Snapshot waiting to be written, tagged with its schedule generation.
struct Pending<T> {
    generation: u64,
    snapshot: Arc<Vec<T>>,
}

impl<T> Clone for Pending<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            snapshot: Arc::clone(&self.snapshot),
        }
    }
}

/// Save worker progress as observed by `flush`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveProgress {
    /// Highest schedule generation whose save has been attempted.
    pub completed: u64,
    /// Error of the most recent attempt, if it failed.
    pub last_error: Option<String>,
}

/// Handle to the save worker of one collection.
///
/// Dropping the handle stops the worker once it finishes the current save.
pub struct SaveQueue<T> {
    collection: &'static str,
    pending: watch::Sender<Option<Pending<T>>>,
    progress: watch::Receiver<SaveProgress>,
    scheduled: u64,
}

impl<T> SaveQueue<T>
where
    T: Serialize + Send + Sync + 'static,
{
    /// Starts the save worker on the current tokio runtime.
    ///
    /// # Errors
    /// - Returns `PersistError::Task` when called outside a tokio runtime.
    pub fn spawn(collection: &'static str, document: Arc<dyn DocumentStore>) -> PersistResult<Self> {
        let runtime = Handle::try_current().map_err(|err| {
            PersistError::Task(format!("save queue for `{collection}` needs a tokio runtime: {err}"))
        })?;
        let (pending_tx, mut pending_rx) = watch::channel::<Option<Pending<T>>>(None);
        let (progress_tx, progress_rx) = watch::channel(SaveProgress::default());

        runtime.spawn(async move {
            while pending_rx.changed().await.is_ok() {
                let Some(pending) = pending_rx.borrow_and_update().clone() else {
                    continue;
                };
                let outcome = write_snapshot(collection, Arc::clone(&document), pending.snapshot).await;
                progress_tx.send_modify(|progress| {
                    progress.completed = pending.generation;
                    progress.last_error = outcome.err().map(|err| err.to_string());
                });
            }
            debug!("event=save_queue_stop module=persist collection={collection}");
        });

        Ok(Self {
            collection,
            pending: pending_tx,
            progress: progress_rx,
            scheduled: 0,
        })
    }

    /// Queues `snapshot` for saving, replacing any not-yet-started snapshot.
    pub fn schedule(&mut self, snapshot: Arc<Vec<T>>) {
        self.scheduled += 1;
        let replaced = self.pending.send_replace(Some(Pending {
            generation: self.scheduled,
            snapshot,
        }));
        debug!(
            "event=save_scheduled module=persist collection={} generation={} replaced_pending={}",
            self.collection,
            self.scheduled,
            replaced.is_some_and(|previous| previous.generation > self.progress.borrow().completed)
        );
    }

    /// Number of saves scheduled so far (coalesced saves included).
    pub fn scheduled(&self) -> u64 {
        self.scheduled
    }

    /// Current worker progress.
    pub fn progress(&self) -> SaveProgress {
        self.progress.borrow().clone()
    }

    /// Waits until the latest scheduled snapshot has been attempted.
    ///
    /// # Errors
    /// - `PersistError::Save` when that attempt failed.
    /// - `PersistError::Task` when the worker stopped before reaching it.
    pub async fn flush(&self) -> PersistResult<()> {
        let target = self.scheduled;
        let mut progress = self.progress.clone();
        let reached = progress
            .wait_for(|progress| progress.completed >= target)
            .await
            .map_err(|_| {
                PersistError::Task(format!("save worker for `{}` stopped", self.collection))
            })?;
        match &reached.last_error {
            Some(message) => Err(PersistError::Save(message.clone())),
            None => Ok(()),
        }
    }
}

async fn write_snapshot<T>(
    collection: &'static str,
    document: Arc<dyn DocumentStore>,
    snapshot: Arc<Vec<T>>,
) -> PersistResult<()>
where
    T: Serialize + Send + Sync + 'static,
{
    let started_at = Instant::now();
    let items = snapshot.len();
    let result = tokio::task::spawn_blocking(move || {
        let bytes = encode_collection(snapshot.as_slice()).map_err(PersistError::Encode)?;
        document.write(&bytes)
    })
    .await
    .map_err(PersistError::from)
    .and_then(|inner| inner);

    match &result {
        Ok(()) => info!(
            "event=collection_save module=persist status=ok collection={} items={} duration_ms={}",
            collection,
            items,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=collection_save module=persist status=error collection={} items={} duration_ms={} error={}",
            collection,
            items,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}
