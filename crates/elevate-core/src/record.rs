//! The `Record` trait: one row of a table, addressed by field name.
//!
//! Each record type declares its schema as associated constants so the
//! generic filter and sorter can be shared by every table instead of being
//! rewritten per page.

use std::fmt;

// ─── Field values ────────────────────────────────────────────────────────────

/// A borrowed view of one field of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
  Text(&'a str),
  /// Numeric and count fields.
  Number(f64),
  /// A raw date string as received from the API; parsed on demand.
  Date(&'a str),
  /// The record has no value under this name.
  Missing,
}

impl FieldValue<'_> {
  pub fn is_missing(&self) -> bool { matches!(self, Self::Missing) }

  /// The text form used for substring and equality matching.
  /// `None` for [`FieldValue::Missing`].
  pub fn as_text(&self) -> Option<String> {
    match self {
      Self::Text(s) | Self::Date(s) => Some((*s).to_owned()),
      Self::Number(n) => Some(format_number(*n)),
      Self::Missing => None,
    }
  }
}

impl<'a> From<&'a str> for FieldValue<'a> {
  fn from(s: &'a str) -> Self { Self::Text(s) }
}

impl<'a> From<Option<&'a str>> for FieldValue<'a> {
  fn from(s: Option<&'a str>) -> Self { s.map_or(Self::Missing, Self::Text) }
}

impl fmt::Display for FieldValue<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Text(s) | Self::Date(s) => f.write_str(s),
      Self::Number(n) => f.write_str(&format_number(*n)),
      Self::Missing => Ok(()),
    }
  }
}

/// Integers print without a trailing `.0`.
fn format_number(n: f64) -> String {
  if n.fract() == 0.0 && n.abs() < 1e15 {
    format!("{}", n as i64)
  } else {
    n.to_string()
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A row of domain data received from the API.
///
/// `id` must be stable and unique within one list snapshot.
pub trait Record: Clone {
  /// Fields the free-text search looks at (matched with OR).
  const SEARCH_FIELDS: &'static [&'static str];

  /// The field `status_equals` compares against.
  const STATUS_FIELD: &'static str = "status";

  /// The field `date_range` is applied to, if the record has one.
  const DATE_FIELD: Option<&'static str> = None;

  /// Named aliases that expand to several fields, matched with OR.
  const FIELD_GROUPS: &'static [(&'static str, &'static [&'static str])] = &[];

  fn id(&self) -> &str;

  /// Look up a field by name. Unknown names yield [`FieldValue::Missing`].
  fn field(&self, name: &str) -> FieldValue<'_>;

  /// The fields a name refers to: the group members if `name` is a group,
  /// otherwise `name` itself.
  fn expand_field(name: &str) -> Vec<&str> {
    Self::FIELD_GROUPS
      .iter()
      .find(|(group, _)| *group == name)
      .map(|(_, members)| members.to_vec())
      .unwrap_or_else(|| vec![name])
  }
}
