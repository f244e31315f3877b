//! Document codec for persisted collections.
//!
//! # Responsibility
//! - Encode a full collection as one JSON array document.
//! - Decode documents written by current and older versions of the app.
//!
//! # Invariants
//! - There is no version header; `lenient` is the version-tolerance
//!   mechanism.
//! - A required-field failure inside any element fails the whole document.

pub mod lenient;
pub mod time;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes a whole collection into one JSON array document.
pub fn encode_collection<T: Serialize>(items: &[T]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(items)
}

/// Parses a whole JSON array document into a collection.
pub fn decode_collection<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, serde_json::Error> {
    serde_json::from_slice(bytes)
}
