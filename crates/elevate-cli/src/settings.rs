//! Settings for the `elevate` binary.
//!
//! Precedence, lowest first: built-in defaults, the optional TOML file,
//! `ELEVATE_*` environment variables, command-line flags.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::ValueEnum;
use elevate_client::{ApiConfig, DEFAULT_BASE_URL};
use elevate_core::{SortParams, referral::ReferralStatus};
use serde::Deserialize;

use crate::app::Tab;

// ─── Role ─────────────────────────────────────────────────────────────────────

/// The reviewer's role, which gates a few actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  Admin,
  Lead,
  /// Sees only their own company's referrals and may not cancel them.
  Referrer,
}

impl Role {
  pub fn is_referrer(self) -> bool { self == Self::Referrer }
}

// ─── AppConfig ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub base_url:       String,
  pub token:          Option<String>,
  pub timeout_secs:   u64,
  pub role:           Role,
  pub default_tab:    Tab,
  /// Status filter applied to the referrals tab on start. Empty for none.
  pub default_status: String,
  /// Initial referral sort, as `<field>_<asc|desc>`.
  pub default_sort:   String,
  pub page_size:      usize,
  pub log_file:       PathBuf,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      base_url:       DEFAULT_BASE_URL.to_owned(),
      token:          None,
      timeout_secs:   10,
      role:           Role::default(),
      default_tab:    Tab::default(),
      default_status: ReferralStatus::Pending.to_string(),
      default_sort:   "date_desc".to_owned(),
      page_size:      20,
      log_file:       PathBuf::from("elevate.log"),
    }
  }
}

impl AppConfig {
  /// Load defaults, then `path` if it exists, then `ELEVATE_*` variables.
  pub fn load(path: Option<&std::path::Path>) -> Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
      builder = builder.add_source(config::File::from(path).required(false));
    }
    builder
      .add_source(config::Environment::with_prefix("ELEVATE"))
      .build()
      .context("reading configuration")?
      .try_deserialize()
      .context("parsing configuration")
  }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      base_url: self.base_url.clone(),
      token:    self.token.clone(),
      timeout:  Duration::from_secs(self.timeout_secs),
    }
  }

  pub fn initial_sort(&self) -> Result<SortParams> {
    self
      .default_sort
      .parse()
      .with_context(|| format!("default_sort = {:?}", self.default_sort))
  }

  pub fn initial_status(&self) -> Result<Option<ReferralStatus>> {
    if self.default_status.trim().is_empty() {
      return Ok(None);
    }
    ReferralStatus::parse(self.default_status.trim())
      .map(Some)
      .with_context(|| format!("default_status = {:?}", self.default_status))
  }
}
