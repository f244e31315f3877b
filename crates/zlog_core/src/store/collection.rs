//! Shared mechanics behind the sleep and tag stores.

use super::{StoreError, StoreResult};
use crate::codec::decode_collection;
use crate::model::Identified;
use crate::persist::{DocumentStore, PersistError, PersistResult, SaveQueue};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// How `upsert` applied its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Ordered collection with change publication and guarded background saves.
pub(crate) struct Collection<T> {
    name: &'static str,
    items: Vec<T>,
    changes: watch::Sender<Arc<Vec<T>>>,
    saves: SaveQueue<T>,
    document: Arc<dyn DocumentStore>,
    should_persist: fn(&[T]) -> bool,
}

impl<T> Collection<T>
where
    T: Identified + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Creates the collection with `initial` items without saving them.
    pub fn new(
        name: &'static str,
        document: Arc<dyn DocumentStore>,
        initial: Vec<T>,
        should_persist: fn(&[T]) -> bool,
    ) -> PersistResult<Self> {
        let saves = SaveQueue::spawn(name, Arc::clone(&document))?;
        let (changes, _) = watch::channel(Arc::new(initial.clone()));
        Ok(Self {
            name,
            items: initial,
            changes,
            saves,
            document,
            should_persist,
        })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.changes.subscribe()
    }

    /// Applies an arbitrary in-memory change, then publishes and saves.
    pub fn mutate<R>(&mut self, transform: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let result = transform(&mut self.items);
        self.commit();
        result
    }

    /// Like `mutate`, but commits only when `transform` succeeds.
    ///
    /// `transform` must leave the items untouched when it returns `Err`.
    pub fn try_mutate<R, E>(
        &mut self,
        transform: impl FnOnce(&mut Vec<T>) -> Result<R, E>,
    ) -> Result<R, E> {
        let result = transform(&mut self.items)?;
        self.commit();
        Ok(result)
    }

    pub fn append(&mut self, item: T) {
        self.mutate(|items| items.push(item));
    }

    /// Replaces the item with the same id, or appends when absent.
    pub fn upsert(&mut self, item: T) -> Upsert {
        self.mutate(|items| match items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => {
                *existing = item;
                Upsert::Replaced
            }
            None => {
                items.push(item);
                Upsert::Inserted
            }
        })
    }

    /// Removes every item with `id`; returns whether anything was removed.
    pub fn remove_by_id(&mut self, id: T::Id) -> bool {
        if !self.items.iter().any(|item| item.id() == id) {
            return false;
        }
        self.mutate(|items| items.retain(|item| item.id() != id));
        true
    }

    pub fn remove_at(&mut self, offsets: &BTreeSet<usize>) -> StoreResult<usize> {
        self.try_mutate(|items| remove_elements(items, offsets))
    }

    pub fn move_items(&mut self, offsets: &BTreeSet<usize>, destination: usize) -> StoreResult<()> {
        self.try_mutate(|items| move_elements(items, offsets, destination))
    }

    /// Replaces the whole collection (used by load and fallbacks).
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.mutate(|current| *current = items);
    }

    /// Reads and decodes the backing document, replacing the collection.
    ///
    /// A missing document yields an empty collection. On decode failure the
    /// in-memory collection is left unchanged and the error is returned.
    pub async fn load(&mut self) -> PersistResult<usize> {
        let started_at = Instant::now();
        info!("event=collection_load module=store status=start collection={}", self.name);
        let document = Arc::clone(&self.document);
        let loaded = tokio::task::spawn_blocking(move || -> PersistResult<Vec<T>> {
            match document.read()? {
                Some(bytes) => decode_collection(&bytes).map_err(PersistError::Decode),
                None => Ok(Vec::new()),
            }
        })
        .await
        .map_err(PersistError::from)
        .and_then(|inner| inner);

        match loaded {
            Ok(items) => {
                let count = items.len();
                self.replace_all(items);
                info!(
                    "event=collection_load module=store status=ok collection={} items={} duration_ms={}",
                    self.name,
                    count,
                    started_at.elapsed().as_millis()
                );
                Ok(count)
            }
            Err(err) => {
                warn!(
                    "event=collection_load module=store status=error collection={} duration_ms={} error={}",
                    self.name,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    pub async fn flush(&self) -> PersistResult<()> {
        self.saves.flush().await
    }

    fn commit(&mut self) {
        let snapshot = Arc::new(self.items.clone());
        self.changes.send_replace(Arc::clone(&snapshot));
        if (self.should_persist)(&self.items) {
            self.saves.schedule(snapshot);
        } else {
            debug!(
                "event=save_skipped module=store collection={} items={}",
                self.name,
                self.items.len()
            );
        }
    }
}

fn check_offsets(offsets: &BTreeSet<usize>, len: usize) -> StoreResult<()> {
    match offsets.last() {
        Some(&index) if index >= len => Err(StoreError::IndexOutOfRange { index, len }),
        _ => Ok(()),
    }
}

/// Removes the elements at `offsets`; returns how many were removed.
///
/// Leaves `items` untouched when any offset is out of range.
pub fn remove_elements<T>(items: &mut Vec<T>, offsets: &BTreeSet<usize>) -> StoreResult<usize> {
    check_offsets(offsets, items.len())?;
    for &index in offsets.iter().rev() {
        items.remove(index);
    }
    Ok(offsets.len())
}

/// Moves the elements at `offsets` so they land before `destination`.
///
/// `destination` is an index into the collection as it was before the move
/// (`0..=len`); moved elements keep their relative order.
pub fn move_elements<T>(
    items: &mut Vec<T>,
    offsets: &BTreeSet<usize>,
    destination: usize,
) -> StoreResult<()> {
    let len = items.len();
    check_offsets(offsets, len)?;
    if destination > len {
        return Err(StoreError::IndexOutOfRange {
            index: destination,
            len,
        });
    }

    let shifted = offsets.range(..destination).count();
    let mut moved = Vec::with_capacity(offsets.len());
    for &index in offsets.iter().rev() {
        moved.push(items.remove(index));
    }
    moved.reverse();
    let insert_at = destination - shifted;
    items.splice(insert_at..insert_at, moved);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{move_elements, remove_elements};
    use crate::store::StoreError;
    use std::collections::BTreeSet;

    fn offsets(values: &[usize]) -> BTreeSet<usize> {
        values.iter().copied().collect()
    }

    #[test]
    fn move_forward_lands_before_destination() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        move_elements(&mut items, &offsets(&[0]), 3).unwrap();
        assert_eq!(items, vec!['b', 'c', 'a', 'd']);
    }

    #[test]
    fn move_to_end_and_to_front() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        move_elements(&mut items, &offsets(&[0, 2]), 4).unwrap();
        assert_eq!(items, vec!['b', 'd', 'a', 'c']);

        let mut items = vec!['a', 'b', 'c', 'd'];
        move_elements(&mut items, &offsets(&[1, 3]), 0).unwrap();
        assert_eq!(items, vec!['b', 'd', 'a', 'c']);
    }

    #[test]
    fn move_rejects_out_of_range_without_changes() {
        let mut items = vec!['a', 'b'];
        let err = move_elements(&mut items, &offsets(&[0]), 3).unwrap_err();
        assert!(matches!(err, StoreError::IndexOutOfRange { index: 3, len: 2 }));
        let err = move_elements(&mut items, &offsets(&[2]), 0).unwrap_err();
        assert!(matches!(err, StoreError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(items, vec!['a', 'b']);
    }

    #[test]
    fn remove_elements_handles_index_sets() {
        let mut items = vec![10, 11, 12, 13, 14];
        assert_eq!(remove_elements(&mut items, &offsets(&[0, 2, 4])).unwrap(), 3);
        assert_eq!(items, vec![11, 13]);

        let err = remove_elements(&mut items, &offsets(&[0, 5])).unwrap_err();
        assert!(matches!(err, StoreError::IndexOutOfRange { index: 5, len: 2 }));
        assert_eq!(items, vec![11, 13]);
    }
}
