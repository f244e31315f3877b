//! In-process document storage.

use super::{DocumentStore, PersistError, PersistResult};
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Document kept in memory; counts writes and can simulate write failures.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    contents: Mutex<Option<Vec<u8>>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an already-saved document.
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: Mutex::new(Some(bytes.into())),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes subsequent writes fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn read(&self) -> PersistResult<Option<Vec<u8>>> {
        Ok(self.contents())
    }

    fn write(&self, bytes: &[u8]) -> PersistResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistError::Io {
                location: self.location(),
                source: std::io::Error::new(ErrorKind::Other, "simulated write failure"),
            });
        }
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
