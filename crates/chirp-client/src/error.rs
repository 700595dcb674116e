//! Error types for `chirp-client`.

use chirp_core::rpc::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The server answered with a typed error body.
  #[error("{}: {message}", code.as_str())]
  Rpc { code: ErrorCode, message: String },

  /// The server answered with an error status but no error body.
  #[error("unexpected status {0}")]
  Status(reqwest::StatusCode),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("json error: {0}")]
  Decode(#[from] serde_json::Error),
}

impl Error {
  /// The RPC error code, if the server sent one.
  pub fn code(&self) -> Option<ErrorCode> {
    match self {
      Self::Rpc { code, .. } => Some(*code),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
