//! Record sorter: comparator selection by field name and direction.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{
  Error,
  date::parse_instant,
  record::{FieldValue, Record},
};

// ─── Parameters ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  #[default]
  Ascending,
  Descending,
}

impl SortDirection {
  pub fn flip(self) -> Self {
    match self {
      Self::Ascending => Self::Descending,
      Self::Descending => Self::Ascending,
    }
  }

  fn apply(self, ord: Ordering) -> Ordering {
    match self {
      Self::Ascending => ord,
      Self::Descending => ord.reverse(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortParams {
  pub field:     String,
  pub direction: SortDirection,
}

impl SortParams {
  pub fn ascending(field: impl Into<String>) -> Self {
    Self { field: field.into(), direction: SortDirection::Ascending }
  }

  pub fn descending(field: impl Into<String>) -> Self {
    Self { field: field.into(), direction: SortDirection::Descending }
  }

  /// Same field, opposite direction.
  pub fn flipped(&self) -> Self {
    Self { field: self.field.clone(), direction: self.direction.flip() }
  }

  /// Compare two records on the selected field, honouring direction.
  pub fn compare<R: Record>(&self, a: &R, b: &R) -> Ordering {
    self
      .direction
      .apply(compare_values(&a.field(&self.field), &b.field(&self.field)))
  }
}

/// Parses sort keys of the form `<field>_<asc|desc>`, e.g. `date_desc`.
impl FromStr for SortParams {
  type Err = Error;

  fn from_str(key: &str) -> Result<Self, Self::Err> {
    let (field, dir) = key
      .rsplit_once('_')
      .ok_or_else(|| Error::InvalidSortKey(key.to_owned()))?;
    if field.is_empty() {
      return Err(Error::InvalidSortKey(key.to_owned()));
    }
    match dir {
      "asc" => Ok(Self::ascending(field)),
      "desc" => Ok(Self::descending(field)),
      _ => Err(Error::InvalidSortKey(key.to_owned())),
    }
  }
}

impl fmt::Display for SortParams {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let dir = match self.direction {
      SortDirection::Ascending => "asc",
      SortDirection::Descending => "desc",
    };
    write!(f, "{}_{dir}", self.field)
  }
}

// ─── Sort ────────────────────────────────────────────────────────────────────

/// Return the records ordered by `params`. The input is left untouched and
/// records with equal keys keep their relative order.
pub fn sort<'a, R, I>(records: I, params: &SortParams) -> Vec<&'a R>
where
  R: Record + 'a,
  I: IntoIterator<Item = &'a R>,
{
  let mut out: Vec<&R> = records.into_iter().collect();
  out.sort_by(|a, b| params.compare(*a, *b));
  out
}

// ─── Comparators ─────────────────────────────────────────────────────────────

/// Total order over field values. Missing values and unparsable dates come
/// first; values of different kinds order by kind.
pub fn compare_values(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
  use FieldValue::*;
  match (a, b) {
    (Text(x), Text(y)) => compare_text(x, y),
    (Number(x), Number(y)) => x.total_cmp(y),
    (Date(x), Date(y)) => parse_instant(x).cmp(&parse_instant(y)),
    _ => kind_rank(a).cmp(&kind_rank(b)),
  }
}

fn kind_rank(v: &FieldValue<'_>) -> u8 {
  match v {
    FieldValue::Missing => 0,
    FieldValue::Date(_) => 1,
    FieldValue::Number(_) => 2,
    FieldValue::Text(_) => 3,
  }
}

/// Locale-style string order. Letters compare first with accents and case
/// ignored, then accents (unaccented first), then case (lowercase first).
pub fn compare_text(a: &str, b: &str) -> Ordering {
  base_letters(a)
    .cmp(base_letters(b))
    .then_with(|| folded(a).cmp(folded(b)))
    .then_with(|| {
      a.chars()
        .zip(b.chars())
        .find(|(x, y)| x != y)
        .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
          (true, false) => Ordering::Less,
          (false, true) => Ordering::Greater,
          _ => x.cmp(&y),
        })
        .unwrap_or_else(|| a.len().cmp(&b.len()))
    })
}

/// Lowercased with combining marks stripped: `É` and `e` are the same letter.
fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
  s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase)
}

/// Lowercased, decomposed, marks kept.
fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
  s.nfd().flat_map(char::to_lowercase)
}
