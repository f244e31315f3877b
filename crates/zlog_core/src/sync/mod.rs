//! Remote dream sharing.
//!
//! # Responsibility
//! - Fetch a random dream shared by other users.
//! - Share a local dream and reconcile its `isUploaded` flag.
//!
//! # Invariants
//! - A failed request never mutates local state.
//! - No request is retried.
//! - Remote dreams and already uploaded dreams are never re-shared.

pub mod api;
pub mod client;

pub use api::{DreamsApi, HttpDreamsApi};
pub use client::{can_share, DreamSource, RemoteSyncClient};

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Reason a dream may not be shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareBlock {
    AlreadyUploaded,
    RemoteSource,
}

impl Display for ShareBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyUploaded => write!(f, "dream was already uploaded"),
            Self::RemoteSource => write!(f, "dream came from the remote service"),
        }
    }
}

/// Remote request failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Transport failed before a response arrived.
    Network(String),
    /// No response within the configured request timeout.
    Timeout,
    /// The service answered with a non-2xx status.
    Status { status: u16, endpoint: String },
    /// The response body was not a dream list.
    Decode(String),
    NotShareable(ShareBlock),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "could not reach the dreams service: {message}"),
            Self::Timeout => write!(f, "the dreams service did not answer in time"),
            Self::Status { status, endpoint } => {
                write!(f, "the dreams service returned HTTP {status} for {endpoint}")
            }
            Self::Decode(message) => write!(f, "unreadable response from the dreams service: {message}"),
            Self::NotShareable(reason) => write!(f, "dream cannot be shared: {reason}"),
        }
    }
}

impl Error for SyncError {}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                endpoint: err.url().map(ToString::to_string).unwrap_or_default(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ShareBlock, SyncError};

    #[test]
    fn messages_are_plain_and_descriptive() {
        let status = SyncError::Status {
            status: 503,
            endpoint: "http://localhost:8080/api/dreams".to_string(),
        };
        assert_eq!(
            status.to_string(),
            "the dreams service returned HTTP 503 for http://localhost:8080/api/dreams"
        );
        assert_eq!(
            SyncError::NotShareable(ShareBlock::AlreadyUploaded).to_string(),
            "dream cannot be shared: dream was already uploaded"
        );
        assert!(SyncError::Timeout.to_string().contains("in time"));
    }
}
