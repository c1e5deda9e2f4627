//! Companies that accept referral requests (`GET /referrals/companies`).

use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, Record};

/// Which materials a company asks for with a referral request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralMaterials {
  #[serde(default = "yes")]
  pub resume:       bool,
  #[serde(default = "yes")]
  pub essay:        bool,
  #[serde(default = "yes")]
  pub phone_number: bool,
}

fn yes() -> bool { true }

impl Default for ReferralMaterials {
  fn default() -> Self { Self { resume: true, essay: true, phone_number: true } }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
  pub id:                 String,
  pub name:               String,
  #[serde(default)]
  pub domain:             String,
  #[serde(default)]
  pub image:              String,
  #[serde(default)]
  pub referral_link:      String,
  #[serde(default = "yes")]
  pub can_refer:          bool,
  /// Absent on the response to an update.
  #[serde(default)]
  pub referral_materials: Option<ReferralMaterials>,
}

impl Record for Company {
  const SEARCH_FIELDS: &'static [&'static str] = &["name", "domain"];
  const STATUS_FIELD: &'static str = "can_refer";

  fn id(&self) -> &str { &self.id }

  fn field(&self, name: &str) -> FieldValue<'_> {
    match name {
      "id" => FieldValue::Text(&self.id),
      "name" => FieldValue::Text(&self.name),
      "domain" => FieldValue::Text(&self.domain),
      "referral_link" => FieldValue::Text(&self.referral_link),
      "can_refer" => FieldValue::Text(if self.can_refer { "yes" } else { "no" }),
      _ => FieldValue::Missing,
    }
  }
}

/// Body of `PATCH /referrals/companies/{id}`. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name:                  Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image:                 Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub referral_link:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub requires_resume:       Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub requires_phone_number: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub requires_essay:        Option<bool>,
}
