//! Async HTTP client for the TechElevate REST API.
//!
//! Implements [`elevate_core::RecordSource`] for the record types the admin
//! tables show, translating HTTP failures into [`elevate_core::SyncError`].

mod client;

pub mod error;

pub use client::{ApiClient, ApiConfig, DEFAULT_BASE_URL};
pub use error::{Error, Result};
