//! Error types for `elevate-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("invalid sort key: {0:?}")]
  InvalidSortKey(String),

  #[error("invalid date: {0:?}")]
  InvalidDate(String),

  #[error("unknown status: {0:?}")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure reported by a [`RecordSource`](crate::sync::RecordSource).
///
/// The filter, sorter and view state never produce these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
  /// The request did not complete (transport failure, timeout, bad payload).
  #[error("network error: {0}")]
  Network(String),

  /// The credential is missing, expired or insufficient.
  #[error("not authorized: {0}")]
  Auth(String),

  /// The server rejected the request body.
  #[error("rejected by server: {0}")]
  Validation(String),
}

impl SyncError {
  /// Whether the caller should end the session.
  pub fn is_auth(&self) -> bool { matches!(self, Self::Auth(_)) }
}
