//! Referral requests as returned by `GET /referrals/all`.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{
  Error, Result,
  record::{FieldValue, Record},
};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Review state of a referral request.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
pub enum ReferralStatus {
  Pending,
  Completed,
  Declined,
  Cancelled,
  /// Any value the server sends that this client does not know.
  #[serde(other)]
  Unknown,
}

impl ReferralStatus {
  /// Parse a status name exactly as the server spells it.
  pub fn parse(s: &str) -> Result<Self> {
    match s.parse() {
      Ok(Self::Unknown) | Err(_) => Err(Error::UnknownStatus(s.to_owned())),
      Ok(status) => Ok(status),
    }
  }

  /// The statuses a reviewer can pick, in display order.
  pub fn selectable() -> impl Iterator<Item = Self> {
    Self::iter().filter(|s| *s != Self::Unknown)
  }

  /// Whether a reviewer with the referrer role may set this status.
  pub fn settable_by_referrer(self) -> bool {
    !matches!(self, Self::Cancelled | Self::Unknown)
  }
}

// ─── Referral ────────────────────────────────────────────────────────────────

/// The company summary embedded in a referral.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralCompany {
  pub name:          String,
  #[serde(default)]
  pub image:         String,
  #[serde(default)]
  pub referral_link: String,
}

/// A member's request to be referred for a job.
///
/// `user_name` and `user_email` are only present on the lead/admin listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
  pub id:            String,
  #[serde(default)]
  pub user_id:       String,
  #[serde(default)]
  pub job_title:     String,
  #[serde(default)]
  pub job_id:        Option<String>,
  #[serde(default)]
  pub role:          String,
  #[serde(default)]
  pub request_note:  String,
  #[serde(default)]
  pub review_note:   Option<String>,
  /// Submission date; either an ISO timestamp or `DD-MM-YYYY`.
  #[serde(default, alias = "submitted_date")]
  pub date:          Option<String>,
  #[serde(default)]
  pub feedback_date: Option<String>,
  pub status:        ReferralStatus,
  #[serde(default)]
  pub resume:        String,
  #[serde(default)]
  pub phone_number:  String,
  #[serde(default)]
  pub essay:         String,
  #[serde(default)]
  pub company:       Option<ReferralCompany>,
  #[serde(default)]
  pub user_name:     Option<String>,
  #[serde(default)]
  pub user_email:    Option<String>,
}

impl Referral {
  pub fn company_name(&self) -> Option<&str> {
    self.company.as_ref().map(|c| c.name.as_str())
  }
}

impl Record for Referral {
  const DATE_FIELD: Option<&'static str> = Some("date");
  const FIELD_GROUPS: &'static [(&'static str, &'static [&'static str])] =
    &[("member", &["user_name", "user_email"])];
  const SEARCH_FIELDS: &'static [&'static str] =
    &["company", "user_name", "job_title"];

  fn id(&self) -> &str { &self.id }

  fn field(&self, name: &str) -> FieldValue<'_> {
    match name {
      "id" => FieldValue::Text(&self.id),
      "company" => self.company_name().into(),
      "job_title" => FieldValue::Text(&self.job_title),
      "job_id" => self.job_id.as_deref().into(),
      "role" => FieldValue::Text(&self.role),
      "status" => FieldValue::Text(self.status.as_ref()),
      "date" => self.date.as_deref().map_or(FieldValue::Missing, FieldValue::Date),
      "feedback_date" => self
        .feedback_date
        .as_deref()
        .map_or(FieldValue::Missing, FieldValue::Date),
      "user_name" | "member" => self.user_name.as_deref().into(),
      "user_email" | "email" => self.user_email.as_deref().into(),
      "phone_number" => FieldValue::Text(&self.phone_number),
      "review_note" => self.review_note.as_deref().into(),
      _ => FieldValue::Missing,
    }
  }
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// Body of `PATCH /referrals/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferralPatch {
  pub status:      ReferralStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub review_note: Option<String>,
}

impl ReferralPatch {
  pub fn status(status: ReferralStatus) -> Self { Self { status, review_note: None } }
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Per-status totals shown above the referral table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReferralStats {
  pub total:     usize,
  pub pending:   usize,
  pub completed: usize,
  pub declined:  usize,
  pub cancelled: usize,
}

impl ReferralStats {
  pub fn of<'a>(referrals: impl IntoIterator<Item = &'a Referral>) -> Self {
    referrals.into_iter().fold(Self::default(), |mut s, r| {
      s.total += 1;
      match r.status {
        ReferralStatus::Pending => s.pending += 1,
        ReferralStatus::Completed => s.completed += 1,
        ReferralStatus::Declined => s.declined += 1,
        ReferralStatus::Cancelled => s.cancelled += 1,
        ReferralStatus::Unknown => {}
      }
      s
    })
  }
}
