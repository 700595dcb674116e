//! API error type and [`axum::response::IntoResponse`] implementation.

use std::time::Duration;

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use chirp_core::rpc::{ErrorBody, ErrorCode, ErrorDetail};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("You are posting too fast")]
  TooManyRequests { retry_after: Duration },

  #[error("{0}")]
  MissingAuthor(String),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("identity provider error: {0}")]
  Identity(#[source] BoxError),

  #[error("rate limiter error: {0}")]
  Limiter(#[source] BoxError),
}

impl ApiError {
  pub fn unauthorized() -> Self { Self::Unauthorized("UNAUTHORIZED".to_string()) }

  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn identity(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Identity(Box::new(e))
  }

  pub fn limiter(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Limiter(Box::new(e))
  }

  pub fn code(&self) -> ErrorCode {
    match self {
      Self::NotFound(_) => ErrorCode::NotFound,
      Self::BadRequest(_) => ErrorCode::BadRequest,
      Self::Unauthorized(_) => ErrorCode::Unauthorized,
      Self::TooManyRequests { .. } => ErrorCode::TooManyRequests,
      Self::MissingAuthor(_)
      | Self::Store(_)
      | Self::Identity(_)
      | Self::Limiter(_) => ErrorCode::InternalServerError,
    }
  }
}

impl From<chirp_core::Error> for ApiError {
  fn from(e: chirp_core::Error) -> Self {
    use chirp_core::Error as E;
    match e {
      E::InvalidContent(_)
      | E::InvalidField { .. }
      | E::SelfFollow
      | E::SelfUnfollow => Self::BadRequest(e.to_string()),
      E::MissingAuthor { .. } => Self::MissingAuthor(e.to_string()),
      E::Identity(inner) => Self::Identity(inner),
    }
  }
}

/// Whole seconds, rounded up, never zero.
fn retry_after_secs(wait: Duration) -> u64 {
  let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
  secs.max(1)
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let code = self.code();
    let message = match &self {
      Self::Store(_) | Self::Identity(_) | Self::Limiter(_) => {
        tracing::error!(error = %self, "request failed");
        "Internal server error".to_string()
      }
      Self::MissingAuthor(m) => {
        tracing::error!(error = %self, "request failed");
        m.clone()
      }
      other => other.to_string(),
    };

    let status = StatusCode::from_u16(code.http_status())
      .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorBody { error: ErrorDetail { code, message } };
    let mut res = (status, Json(body)).into_response();

    if let Self::TooManyRequests { retry_after } = self {
      res.headers_mut().insert(
        header::RETRY_AFTER,
        HeaderValue::from(retry_after_secs(retry_after)),
      );
    }
    res
  }
}
