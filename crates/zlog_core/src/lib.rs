//! Persistence and sync core for the zlog sleep and dream journal.
//! This crate is the single source of truth for journal invariants.

pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod persist;
pub mod stats;
pub mod store;
pub mod sync;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LogLevel};
pub use model::dream::{Dream, DreamId, DreamRating, DreamType};
pub use model::sleep::{PartOfDay, Sleep, SleepId};
pub use model::tag::{Tag, TagId, TagValidationError};
pub use persist::{
    DocumentStore, FileDocumentStore, MemoryDocumentStore, PersistError, PersistResult,
};
pub use stats::JournalStats;
pub use store::sleep_store::SleepStore;
pub use store::tag_store::TagStore;
pub use store::{LoadOutcome, StoreError, StoreResult, Upsert};
pub use sync::{can_share, DreamSource, DreamsApi, HttpDreamsApi, RemoteSyncClient, SyncError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
