//! Error type for `elevate-client`.
//!
//! Request failures are reported as [`elevate_core::SyncError`]; this type
//! only covers constructing the client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Build(#[from] reqwest::Error),

  #[error("invalid base URL: {0:?}")]
  BaseUrl(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
