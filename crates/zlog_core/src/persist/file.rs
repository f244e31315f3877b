//! File-backed document storage.
//!
//! # Invariants
//! - Writes go to a sibling temp file that is then renamed over the target,
//!   so readers observe either the previous or the new full document.
//! - The parent directory is created on first write.

use super::{DocumentStore, PersistError, PersistResult};
use log::{error, info};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One collection document stored as a single file.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    path: PathBuf,
}

impl FileDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            location: self.location(),
            source,
        }
    }

    fn write_atomically(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.temp_path();
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)
    }
}

impl DocumentStore for FileDocumentStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> PersistResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "event=document_read module=persist status=ok found=false path={}",
                    self.path.display()
                );
                Ok(None)
            }
            Err(err) => {
                error!(
                    "event=document_read module=persist status=error path={} error={}",
                    self.path.display(),
                    err
                );
                Err(self.io_error(err))
            }
        }
    }

    fn write(&self, bytes: &[u8]) -> PersistResult<()> {
        let started_at = Instant::now();
        match self.write_atomically(bytes) {
            Ok(()) => {
                info!(
                    "event=document_write module=persist status=ok path={} bytes={} duration_ms={}",
                    self.path.display(),
                    bytes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=document_write module=persist status=error path={} duration_ms={} error={}",
                    self.path.display(),
                    started_at.elapsed().as_millis(),
                    err
                );
                let _ = fs::remove_file(self.temp_path());
                Err(self.io_error(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FileDocumentStore;
    use crate::persist::DocumentStore;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileDocumentStore::new(dir.path().join("sleeps.data"));
        assert!(store.read().expect("read").is_none());
    }

    #[test]
    fn write_creates_parent_and_replaces_contents() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileDocumentStore::new(dir.path().join("nested").join("tags.data"));
        store.write(b"[1]").expect("first write");
        store.write(b"[1,2]").expect("second write");
        assert_eq!(store.read().expect("read"), Some(b"[1,2]".to_vec()));
        assert!(!store.temp_path().exists());
    }
}
