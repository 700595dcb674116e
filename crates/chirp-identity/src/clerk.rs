//! [`ClerkIdentity`]: async client for a Clerk-style backend API.
//!
//! | Method | Path | Used for |
//! |--------|------|----------|
//! | `GET` | `/v1/sessions/{id}` | Resolving a bearer session to a user id |
//! | `GET` | `/v1/users/{id}` | Single-user lookup |
//! | `GET` | `/v1/users?user_id=…&username=…&limit=…` | Batch lookup |

use std::time::Duration;

use chirp_core::identity::{IdentityProvider, IdentityUser, UserListFilter};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{Error, Result};

const ACTIVE_SESSION: &str = "active";

/// Connection settings for the identity provider's backend API.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
  #[serde(default = "default_api_url")]
  pub api_url:      String,
  /// Backend secret key, sent as a bearer token on every call.
  pub secret_key:   String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_api_url() -> String { "https://api.clerk.com".to_string() }

fn default_timeout_secs() -> u64 { 10 }

#[derive(Debug, Deserialize)]
struct SessionRecord {
  user_id: String,
  status:  String,
}

/// HTTP client for the hosted identity provider.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ClerkIdentity {
  client: Client,
  config: IdentityConfig,
}

impl ClerkIdentity {
  pub fn new(config: IdentityConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/v1{}", self.config.api_url.trim_end_matches('/'), path)
  }

  /// `GET` a JSON resource. A 404 is `Ok(None)`.
  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<Option<T>> {
    tracing::debug!(path, "identity provider request");
    let resp = self
      .client
      .get(self.url(path))
      .bearer_auth(&self.config.secret_key)
      .query(query)
      .send()
      .await?;

    match resp.status() {
      StatusCode::NOT_FOUND => Ok(None),
      s if s.is_success() => Ok(Some(resp.json().await?)),
      status => Err(Error::Status {
        method: "GET",
        path: path.to_owned(),
        status,
      }),
    }
  }
}

/// Provider ids are short ASCII tokens such as `sess_2abc` or `user_2abc`.
/// Anything else cannot name a resource and is never sent.
fn is_plain_id(id: &str) -> bool {
  !id.is_empty()
    && id
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

impl IdentityProvider for ClerkIdentity {
  type Error = Error;

  async fn resolve_session(&self, session_id: &str) -> Result<Option<String>> {
    if !is_plain_id(session_id) {
      return Ok(None);
    }
    let session: Option<SessionRecord> = self
      .get_json(&format!("/sessions/{session_id}"), &[])
      .await?;
    Ok(
      session
        .filter(|s| s.status == ACTIVE_SESSION)
        .map(|s| s.user_id),
    )
  }

  async fn get_user(&self, user_id: &str) -> Result<Option<IdentityUser>> {
    if !is_plain_id(user_id) {
      return Ok(None);
    }
    self.get_json(&format!("/users/{user_id}"), &[]).await
  }

  async fn get_user_list(&self, filter: &UserListFilter) -> Result<Vec<IdentityUser>> {
    // An unfiltered list call would page through every account.
    if filter.user_ids.is_empty() && filter.usernames.is_empty() {
      return Ok(Vec::new());
    }

    let mut query: Vec<(&str, String)> = Vec::new();
    query.extend(filter.user_ids.iter().map(|id| ("user_id", id.clone())));
    query.extend(filter.usernames.iter().map(|u| ("username", u.clone())));
    if let Some(limit) = filter.limit {
      query.push(("limit", limit.to_string()));
    }

    let users: Option<Vec<IdentityUser>> = self.get_json("/users", &query).await?;
    Ok(users.unwrap_or_default())
  }
}
