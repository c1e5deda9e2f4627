//! `ApiClient`: authenticated JSON calls to the TechElevate API.

use std::time::Duration;

use elevate_core::{
  RecordSource, SyncError,
  company::{Company, CompanyPatch},
  learning::MemberProgress,
  referral::{Referral, ReferralPatch},
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Where the API lives when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Bearer token sent as `Authorization: Bearer <token>`.
  pub token:    Option<String>,
  pub timeout:  Duration,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_owned(),
      token:    None,
      timeout:  DEFAULT_TIMEOUT,
    }
  }
}

// ─── Response envelopes ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ReferralList {
  #[serde(default)]
  referrals: Vec<Referral>,
}

#[derive(Deserialize)]
struct ReferralEnvelope {
  referral: Referral,
}

#[derive(Deserialize)]
struct CompanyList {
  #[serde(default)]
  companies: Vec<Company>,
}

#[derive(Deserialize)]
struct CompanyEnvelope {
  company: Company,
}

#[derive(Deserialize)]
struct ProgressList {
  #[serde(default)]
  members: Vec<MemberProgress>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP client for the TechElevate REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    if !(config.base_url.starts_with("http://")
      || config.base_url.starts_with("https://"))
    {
      return Err(Error::BaseUrl(config.base_url));
    }
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &ApiConfig { &self.config }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match self.config.token.as_deref() {
      Some(token) if !token.is_empty() => req.bearer_auth(token),
      _ => req,
    }
  }

  /// Send `req` and decode a JSON body, mapping every failure to a
  /// [`SyncError`]. `what` names the call in logs and messages.
  async fn send<T: DeserializeOwned>(
    &self,
    req: RequestBuilder,
    what: &str,
  ) -> Result<T, SyncError> {
    debug!("{what}");
    let resp = self.auth(req).send().await.map_err(|e| {
      warn!(error = %e, "{what} did not complete");
      SyncError::Network(format!("{what}: {e}"))
    })?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      let err = classify(status, &body);
      warn!(%status, error = %err, "{what} failed");
      return Err(err);
    }

    debug!(%status, "{what} ok");
    resp
      .json()
      .await
      .map_err(|e| SyncError::Network(format!("decoding {what}: {e}")))
  }

  // ── Referrals ─────────────────────────────────────────────────────────────

  /// `GET /referrals/all`
  pub async fn list_referrals(&self) -> Result<Vec<Referral>, SyncError> {
    let list: ReferralList = self
      .send(self.client.get(self.url("/referrals/all")), "GET /referrals/all")
      .await?;
    Ok(list.referrals)
  }

  /// `PATCH /referrals/{id}`
  pub async fn update_referral(
    &self,
    id: &str,
    patch: &ReferralPatch,
  ) -> Result<Referral, SyncError> {
    let path = format!("/referrals/{id}");
    let env: ReferralEnvelope = self
      .send(
        self.client.patch(self.url(&path)).json(patch),
        &format!("PATCH {path}"),
      )
      .await?;
    Ok(env.referral)
  }

  // ── Companies ─────────────────────────────────────────────────────────────

  /// `GET /referrals/companies`
  pub async fn list_companies(&self) -> Result<Vec<Company>, SyncError> {
    let list: CompanyList = self
      .send(
        self.client.get(self.url("/referrals/companies")),
        "GET /referrals/companies",
      )
      .await?;
    Ok(list.companies)
  }

  /// `PATCH /referrals/companies/{id}`
  pub async fn update_company(
    &self,
    id: &str,
    patch: &CompanyPatch,
  ) -> Result<Company, SyncError> {
    let path = format!("/referrals/companies/{id}");
    let env: CompanyEnvelope = self
      .send(
        self.client.patch(self.url(&path)).json(patch),
        &format!("PATCH {path}"),
      )
      .await?;
    Ok(env.company)
  }

  // ── Learning ──────────────────────────────────────────────────────────────

  /// `GET /learning/admin/all-progress`
  pub async fn list_member_progress(&self) -> Result<Vec<MemberProgress>, SyncError> {
    let list: ProgressList = self
      .send(
        self.client.get(self.url("/learning/admin/all-progress")),
        "GET /learning/admin/all-progress",
      )
      .await?;
    Ok(list.members)
  }
}

// ─── RecordSource ────────────────────────────────────────────────────────────

impl RecordSource<Referral> for ApiClient {
  type Patch = ReferralPatch;

  async fn fetch_all(&self) -> Result<Vec<Referral>, SyncError> {
    self.list_referrals().await
  }

  async fn update(&self, id: &str, patch: ReferralPatch) -> Result<Referral, SyncError> {
    self.update_referral(id, &patch).await
  }
}

impl RecordSource<Company> for ApiClient {
  type Patch = CompanyPatch;

  async fn fetch_all(&self) -> Result<Vec<Company>, SyncError> {
    self.list_companies().await
  }

  async fn update(&self, id: &str, patch: CompanyPatch) -> Result<Company, SyncError> {
    self.update_company(id, &patch).await
  }
}

// ─── Error mapping ───────────────────────────────────────────────────────────

/// Map a non-success response to the sync error taxonomy.
pub(crate) fn classify(status: StatusCode, body: &str) -> SyncError {
  let detail = detail_message(body).unwrap_or_else(|| status.to_string());
  match status {
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Auth(detail),
    StatusCode::BAD_REQUEST
    | StatusCode::NOT_FOUND
    | StatusCode::CONFLICT
    | StatusCode::UNPROCESSABLE_ENTITY => SyncError::Validation(detail),
    _ => SyncError::Network(format!("{status}: {detail}")),
  }
}

/// Extract FastAPI's `detail`, which is either a string or a list of
/// `{loc, msg, type}` objects.
fn detail_message(body: &str) -> Option<String> {
  let value: serde_json::Value = serde_json::from_str(body).ok()?;
  match value.get("detail")? {
    serde_json::Value::String(s) => Some(s.clone()),
    serde_json::Value::Array(items) => {
      let msgs: Vec<&str> = items
        .iter()
        .filter_map(|i| i.get("msg").and_then(|m| m.as_str()))
        .collect();
      (!msgs.is_empty()).then(|| msgs.join("; "))
    }
    other => Some(other.to_string()),
  }
}
