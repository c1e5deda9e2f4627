//! Lenient date parsing for the formats the API emits.
//!
//! Referral dates arrive either as ISO timestamps or as `DD-MM-YYYY` strings,
//! depending on which code path created the record.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse `raw` to a comparable instant (UTC for offset-carrying inputs,
/// midnight for date-only inputs). Returns `None` if no format matches.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.naive_utc());
  }
  DATETIME_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .or_else(|| {
      DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

/// Parse `raw` to a calendar date, discarding any time component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  parse_instant(raw).map(|dt| dt.date())
}
