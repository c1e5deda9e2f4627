//! Record filter: predicate composition over a record and a parameter set.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  date::parse_date,
  record::{FieldValue, Record},
};

// ─── Parameters ──────────────────────────────────────────────────────────────

/// Inclusive calendar-date bounds. A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: Option<NaiveDate>,
  pub end:   Option<NaiveDate>,
}

impl DateRange {
  /// Build a range from the strings of two date inputs. Empty strings leave
  /// the side unbounded.
  pub fn parse(start: &str, end: &str) -> Result<Self> {
    let bound = |raw: &str| -> Result<Option<NaiveDate>> {
      if raw.trim().is_empty() {
        return Ok(None);
      }
      parse_date(raw)
        .map(Some)
        .ok_or_else(|| Error::InvalidDate(raw.to_owned()))
    };
    Ok(Self { start: bound(start)?, end: bound(end)? })
  }

  pub fn is_unbounded(&self) -> bool { self.start.is_none() && self.end.is_none() }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
  }
}

/// The active filters of one table. Empty values mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
  /// Case-insensitive substring matched against the record's search fields.
  pub search:         String,
  /// Exact match on the record's status field.
  pub status_equals:  Option<String>,
  /// Field (or field group) → case-insensitive substring.
  pub field_contains: BTreeMap<String, String>,
  pub date_range:     Option<DateRange>,
}

impl FilterParams {
  pub fn with_search(mut self, search: impl Into<String>) -> Self {
    self.search = search.into();
    self
  }

  pub fn with_status(mut self, status: impl Into<String>) -> Self {
    self.status_equals = Some(status.into());
    self
  }

  pub fn with_contains(
    mut self,
    field: impl Into<String>,
    needle: impl Into<String>,
  ) -> Self {
    self.field_contains.insert(field.into(), needle.into());
    self
  }

  pub fn with_date_range(mut self, range: DateRange) -> Self {
    self.date_range = Some(range);
    self
  }

  fn status(&self) -> Option<&str> {
    self.status_equals.as_deref().filter(|s| !s.is_empty())
  }

  fn range(&self) -> Option<&DateRange> {
    self.date_range.as_ref().filter(|r| !r.is_unbounded())
  }

  /// Whether any constraint is in effect.
  pub fn is_active(&self) -> bool {
    !self.search.is_empty()
      || self.status().is_some()
      || self.field_contains.values().any(|v| !v.is_empty())
      || self.range().is_some()
  }

  /// Drop every constraint.
  pub fn clear(&mut self) { *self = Self::default(); }

  /// Whether `record` satisfies every non-empty constraint.
  pub fn matches<R: Record>(&self, record: &R) -> bool {
    if !self.search.is_empty()
      && !any_contains(record, R::SEARCH_FIELDS, &self.search)
    {
      return false;
    }

    if let Some(status) = self.status() {
      match record.field(R::STATUS_FIELD) {
        FieldValue::Missing => return false,
        value => {
          if value.as_text().as_deref() != Some(status) {
            return false;
          }
        }
      }
    }

    for (name, needle) in &self.field_contains {
      if needle.is_empty() {
        continue;
      }
      if !any_contains(record, &R::expand_field(name), needle) {
        return false;
      }
    }

    if let Some(range) = self.range() {
      let date = R::DATE_FIELD.and_then(|name| match record.field(name) {
        FieldValue::Date(raw) | FieldValue::Text(raw) => parse_date(raw),
        _ => None,
      });
      match date {
        Some(d) if range.contains(d) => {}
        _ => return false,
      }
    }

    true
  }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Keep the records that satisfy `params`, in their original order.
pub fn filter<'a, R: Record>(records: &'a [R], params: &FilterParams) -> Vec<&'a R> {
  records.iter().filter(|r| params.matches(*r)).collect()
}

fn any_contains<R: Record>(record: &R, fields: &[&str], needle: &str) -> bool {
  let needle = needle.to_lowercase();
  fields.iter().any(|name| {
    record
      .field(name)
      .as_text()
      .is_some_and(|text| text.to_lowercase().contains(&needle))
  })
}
