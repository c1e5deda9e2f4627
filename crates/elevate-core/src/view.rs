//! View-state container: the filter/sort/pagination configuration of one
//! table view, plus a shared reference to the current record snapshot.
//!
//! The visible list is never patched incrementally: every read recomputes
//! `sort(filter(records, filter), sort)` from the current snapshot.

use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;

use crate::{
  filter::{FilterParams, filter},
  record::Record,
  sort::{SortParams, sort},
};

// ─── Pagination ──────────────────────────────────────────────────────────────

/// Page selection. `per_page = None` shows every record on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  /// 1-based.
  pub page:     usize,
  pub per_page: Option<usize>,
}

impl Default for Pagination {
  fn default() -> Self { Self { page: 1, per_page: None } }
}

impl Pagination {
  pub fn per_page(per_page: usize) -> Self {
    Self { page: 1, per_page: (per_page > 0).then_some(per_page) }
  }

  pub fn total_pages(&self, total_items: usize) -> usize {
    match self.per_page {
      Some(n) => total_items.div_ceil(n).max(1),
      None => 1,
    }
  }
}

/// One page of the visible records.
#[derive(Debug, Serialize)]
pub struct Page<T> {
  pub items:       Vec<T>,
  /// The page actually shown, after clamping.
  pub page:        usize,
  pub total_pages: usize,
  /// Visible records across all pages.
  pub total_items: usize,
}

// ─── ViewState ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ViewState<R> {
  records:    Arc<Vec<R>>,
  filter:     FilterParams,
  sort:       SortParams,
  pagination: Pagination,
}

impl<R: Record> ViewState<R> {
  pub fn new(sort: SortParams) -> Self {
    Self {
      records: Arc::new(Vec::new()),
      filter: FilterParams::default(),
      sort,
      pagination: Pagination::default(),
    }
  }

  pub fn with_filter(mut self, filter: FilterParams) -> Self {
    self.filter = filter;
    self
  }

  pub fn with_pagination(mut self, pagination: Pagination) -> Self {
    self.pagination = pagination;
    self
  }

  // ── Accessors ─────────────────────────────────────────────────────────

  pub fn records(&self) -> &Arc<Vec<R>> { &self.records }

  pub fn filter_params(&self) -> &FilterParams { &self.filter }

  pub fn sort_params(&self) -> &SortParams { &self.sort }

  pub fn pagination(&self) -> Pagination { self.pagination }

  // ── Mutation ──────────────────────────────────────────────────────────

  /// Replace the record snapshot. A page past the new end moves back to the
  /// last page.
  pub fn set_records(&mut self, records: impl Into<Arc<Vec<R>>>) {
    self.records = records.into();
    self.clamp_page();
  }

  /// Replace the filter. Returns to the first page.
  pub fn set_filter(&mut self, params: FilterParams) {
    self.filter = params;
    self.pagination.page = 1;
  }

  /// Edit the filter in place. Returns to the first page.
  pub fn update_filter(&mut self, edit: impl FnOnce(&mut FilterParams)) {
    edit(&mut self.filter);
    self.pagination.page = 1;
  }

  pub fn clear_filters(&mut self) { self.set_filter(FilterParams::default()); }

  /// Replace the sort. Returns to the first page.
  pub fn set_sort(&mut self, params: SortParams) {
    self.sort = params;
    self.pagination.page = 1;
  }

  pub fn set_page(&mut self, page: usize) { self.pagination.page = page.max(1); }

  pub fn next_page(&mut self) {
    let total = self.pagination.total_pages(self.visible_records().len());
    if self.pagination.page < total {
      self.pagination.page += 1;
    }
  }

  pub fn prev_page(&mut self) {
    self.clamp_page();
    self.pagination.page = self.pagination.page.saturating_sub(1).max(1);
  }

  fn clamp_page(&mut self) {
    let total = self.pagination.total_pages(self.visible_records().len());
    self.pagination.page = self.pagination.page.clamp(1, total);
  }

  /// Replace the record with the same id as `record`. The snapshot is copied
  /// first if another holder still shares it. Returns `false` if no record
  /// has that id.
  pub fn apply_update(&mut self, record: R) -> bool {
    let Some(idx) = self.records.iter().position(|r| r.id() == record.id())
    else {
      return false;
    };
    Arc::make_mut(&mut self.records)[idx] = record;
    true
  }

  // ── Derived ───────────────────────────────────────────────────────────

  /// `sort(filter(records, filter), sort)` over the current snapshot.
  pub fn visible_records(&self) -> Vec<&R> {
    sort(filter(self.records.as_slice(), &self.filter), &self.sort)
  }

  /// The current page of [`visible_records`](Self::visible_records).
  /// Out-of-range pages clamp to the last page.
  pub fn visible_page(&self) -> Page<&R> {
    let visible = self.visible_records();
    let total_items = visible.len();
    let total_pages = self.pagination.total_pages(total_items);
    let page = self.pagination.page.clamp(1, total_pages);

    let items = match self.pagination.per_page {
      Some(n) => visible.into_iter().skip((page - 1) * n).take(n).collect(),
      None => visible,
    };

    Page { items, page, total_pages, total_items }
  }

  /// Count records per value of `field` over the whole snapshot, ignoring
  /// the filter. Records missing the field are not counted.
  pub fn count_by(&self, field: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in self.records.iter().filter_map(|r| r.field(field).as_text()) {
      *counts.entry(value).or_insert(0) += 1;
    }
    counts
  }
}
