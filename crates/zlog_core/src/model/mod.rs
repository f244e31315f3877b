//! Journal domain model.
//!
//! # Responsibility
//! - Define the entities persisted by the record and tag stores.
//! - Provide derived, non-persisted projections (sleep display labels).
//!
//! # Invariants
//! - Every entity carries a stable UUID that is never reused.
//! - A `Dream` belongs to exactly one `Sleep`; its `tags` are value copies,
//!   not references into the tag collection.

pub mod dream;
pub mod samples;
pub mod sleep;
pub mod tag;

use std::fmt::Display;

/// Entity with a stable identity inside an ordered collection.
///
/// Collection mutations (`upsert`, `remove_by_id`) match on this id.
pub trait Identified {
    type Id: Copy + PartialEq + Display;

    fn id(&self) -> Self::Id;
}
