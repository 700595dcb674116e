//! Bearer-session extractor.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chirp_core::{
  identity::IdentityProvider, ratelimit::RateLimiter, store::SocialStore,
  user::User,
};

use crate::{AppState, error::ApiError, users::load_user};

/// The signed-in caller. Present in a handler means the request carried an
/// active session.
#[derive(Debug, Clone)]
pub struct Session {
  pub user_id: String,
}

/// The session id from `Authorization: Bearer <id>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

impl Session {
  /// The caller's stored user row, created on first use.
  pub async fn ensure_user<S, I, L>(
    &self,
    state: &AppState<S, I, L>,
  ) -> Result<User, ApiError>
  where
    S: SocialStore,
    I: IdentityProvider,
    L: RateLimiter,
  {
    load_user(state, &self.user_id)
      .await?
      .ok_or_else(|| ApiError::NotFound("Could not find signed-in user".to_string()))
  }
}

impl<S, I, L> FromRequestParts<AppState<S, I, L>> for Session
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, I, L>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
    let user_id = state
      .identity
      .resolve_session(token)
      .await
      .map_err(ApiError::identity)?
      .ok_or_else(ApiError::unauthorized)?;
    Ok(Session { user_id })
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn extracts_bearer_token() {
    assert_eq!(bearer_token(&headers("Bearer sess_a")), Some("sess_a"));
  }

  #[test]
  fn rejects_other_schemes() {
    assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
    assert_eq!(bearer_token(&headers("Bearer ")), None);
    assert_eq!(bearer_token(&HeaderMap::new()), None);
  }
}
