//! Core types for the TechElevate admin tables.
//!
//! Records, the filter/sort pair, the view-state container, and the contract
//! for the remote collaborator that fetches and updates records. This crate has
//! no HTTP or terminal dependencies.

// Native `async fn` in traits; the returned futures are `Send` by signature.
#![allow(async_fn_in_trait)]

pub mod company;
pub mod date;
pub mod error;
pub mod filter;
pub mod learning;
pub mod record;
pub mod referral;
pub mod sort;
pub mod sync;
pub mod view;

pub use error::{Error, Result, SyncError};
pub use filter::{DateRange, FilterParams, filter};
pub use record::{FieldValue, Record};
pub use sort::{SortDirection, SortParams, sort};
pub use sync::{FetchOutcome, FetchTicket, RecordSource, SyncedView};
pub use view::{Page, Pagination, ViewState};
