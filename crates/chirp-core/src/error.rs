//! Error types for `chirp-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("post content must be between 1 and 280 characters, got {0}")]
  InvalidContent(usize),

  #[error("{field} must be between {min} and {max} characters")]
  InvalidField {
    field: &'static str,
    min:   usize,
    max:   usize,
  },

  #[error("cannot follow yourself")]
  SelfFollow,

  #[error("cannot unfollow yourself")]
  SelfUnfollow,

  /// The identity provider had no usable record for a post's author.
  #[error("could not find author {author_id} for post {post_id}")]
  MissingAuthor { post_id: Uuid, author_id: String },

  #[error("identity provider error: {0}")]
  Identity(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
