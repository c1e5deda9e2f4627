//! The remote collaborator contract and the view that consumes it.
//!
//! [`RecordSource`] is implemented by the HTTP client (`elevate-client`).
//! [`SyncedView`] never talks to the network itself: callers start a fetch,
//! run it wherever they like, and hand the result back with the ticket they
//! were given. Only the most recently issued ticket may change the list, so a
//! slow response can never overwrite a newer one.

use std::future::Future;

use tracing::debug;

use crate::{
  error::SyncError,
  record::Record,
  sort::SortParams,
  view::ViewState,
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Fetches a record list and pushes single-record updates back.
///
/// Implementations own any retry or backoff policy; callers treat an error as
/// "no change to the underlying list".
pub trait RecordSource<R: Record>: Send + Sync {
  /// Partial fields accepted by [`update`](Self::update).
  type Patch: Send;

  /// Fetch the full record list.
  fn fetch_all(&self) -> impl Future<Output = Result<Vec<R>, SyncError>> + Send + '_;

  /// Apply `patch` to the record `id` and return the updated record.
  fn update<'a>(
    &'a self,
    id: &'a str,
    patch: Self::Patch,
  ) -> impl Future<Output = Result<R, SyncError>> + Send + 'a;
}

// ─── Tickets ─────────────────────────────────────────────────────────────────

/// Identifies one fetch. Later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// What [`SyncedView::complete_fetch`] did with a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
  /// The list was replaced; carries the new record count.
  Applied(usize),
  /// A newer fetch was started after this one; the result was dropped.
  Stale,
  /// The fetch failed; the list is unchanged.
  Failed(SyncError),
}

// ─── SyncedView ──────────────────────────────────────────────────────────────

/// A [`ViewState`] kept in step with a remote source.
#[derive(Debug, Clone)]
pub struct SyncedView<R> {
  view:       ViewState<R>,
  issued:     u64,
  completed:  u64,
  last_error: Option<SyncError>,
}

impl<R: Record> SyncedView<R> {
  pub fn new(view: ViewState<R>) -> Self {
    Self { view, issued: 0, completed: 0, last_error: None }
  }

  pub fn with_sort(sort: SortParams) -> Self { Self::new(ViewState::new(sort)) }

  pub fn view(&self) -> &ViewState<R> { &self.view }

  pub fn view_mut(&mut self) -> &mut ViewState<R> { &mut self.view }

  /// The error of the most recent failed fetch or update, if it has not been
  /// cleared by a later success.
  pub fn last_error(&self) -> Option<&SyncError> { self.last_error.as_ref() }

  /// Whether the latest fetch is still outstanding.
  pub fn loading(&self) -> bool { self.completed < self.issued }

  /// Start a fetch. Any ticket issued earlier becomes stale.
  pub fn begin_fetch(&mut self) -> FetchTicket {
    self.issued += 1;
    FetchTicket(self.issued)
  }

  /// Hand back the result of the fetch identified by `ticket`.
  pub fn complete_fetch(
    &mut self,
    ticket: FetchTicket,
    result: Result<Vec<R>, SyncError>,
  ) -> FetchOutcome {
    if ticket.0 != self.issued {
      debug!(ticket = ticket.0, latest = self.issued, "dropping stale fetch");
      return FetchOutcome::Stale;
    }
    self.completed = ticket.0;
    match result {
      Ok(records) => {
        let n = records.len();
        self.view.set_records(records);
        self.last_error = None;
        FetchOutcome::Applied(n)
      }
      Err(e) => {
        self.last_error = Some(e.clone());
        FetchOutcome::Failed(e)
      }
    }
  }

  /// Hand back the result of a single-record update. A failure leaves the
  /// list unchanged. Returns whether a record was replaced.
  pub fn complete_update(&mut self, result: Result<R, SyncError>) -> bool {
    match result {
      Ok(record) => {
        self.last_error = None;
        self.view.apply_update(record)
      }
      Err(e) => {
        self.last_error = Some(e);
        false
      }
    }
  }

  /// Fetch from `source` and apply the result, unless another fetch was
  /// started on this view in the meantime.
  pub async fn refresh<S>(&mut self, source: &S) -> FetchOutcome
  where
    S: RecordSource<R>,
  {
    let ticket = self.begin_fetch();
    let result = source.fetch_all().await;
    self.complete_fetch(ticket, result)
  }

  /// Push `patch` for record `id` to `source` and apply the response.
  pub async fn update<S>(
    &mut self,
    source: &S,
    id: &str,
    patch: S::Patch,
  ) -> Result<(), SyncError>
  where
    S: RecordSource<R>,
  {
    let result = source.update(id, patch).await;
    let err = result.as_ref().err().cloned();
    self.complete_update(result);
    err.map_or(Ok(()), Err)
  }
}
