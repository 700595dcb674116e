//! Posts and the author projection attached to them on read.
//!
//! Posts are immutable once stored. Ids are UUIDv7, so ordering by id is
//! ordering by creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

pub const CONTENT_MAX_CHARS: usize = 280;

// ─── Post ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub id:          Uuid,
  pub author_id:   String,
  pub content:     String,
  /// The post this one answers, if it is a reply.
  pub reply_to_id: Option<Uuid>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::SocialStore::create_post`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub author_id:   String,
  pub content:     String,
  pub reply_to_id: Option<Uuid>,
}

impl NewPost {
  /// Build a top-level post, rejecting content outside 1–280 characters.
  pub fn new(author_id: impl Into<String>, content: impl Into<String>) -> Result<Self> {
    let content = content.into();
    validate_content(&content)?;
    Ok(Self {
      author_id: author_id.into(),
      content,
      reply_to_id: None,
    })
  }

  /// Build a reply to `parent`.
  pub fn reply(
    author_id: impl Into<String>,
    content: impl Into<String>,
    parent: Uuid,
  ) -> Result<Self> {
    let mut post = Self::new(author_id, content)?;
    post.reply_to_id = Some(parent);
    Ok(post)
  }
}

/// Content length is counted in Unicode scalar values.
pub fn validate_content(content: &str) -> Result<()> {
  let len = content.chars().count();
  if len == 0 || len > CONTENT_MAX_CHARS {
    return Err(Error::InvalidContent(len));
  }
  Ok(())
}

// ─── Author ──────────────────────────────────────────────────────────────────

/// The client-safe subset of an identity-provider user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
  pub id:                String,
  pub username:          String,
  pub first_name:        String,
  pub last_name:         String,
  pub profile_image_url: String,
}

/// A post joined with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithAuthor {
  #[serde(flatten)]
  pub post:   Post,
  pub author: Author,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn content_bounds() {
    assert!(matches!(
      NewPost::new("user_1", ""),
      Err(Error::InvalidContent(0))
    ));
    assert!(NewPost::new("user_1", "x").is_ok());
    assert!(NewPost::new("user_1", "x".repeat(CONTENT_MAX_CHARS)).is_ok());
    assert!(matches!(
      NewPost::new("user_1", "x".repeat(CONTENT_MAX_CHARS + 1)),
      Err(Error::InvalidContent(281))
    ));
  }

  #[test]
  fn content_counts_characters_not_bytes() {
    // 280 multi-byte characters are still within the limit.
    let emoji = "🐦".repeat(CONTENT_MAX_CHARS);
    assert!(emoji.len() > CONTENT_MAX_CHARS);
    assert!(validate_content(&emoji).is_ok());
  }

  #[test]
  fn reply_sets_parent() {
    let parent = Uuid::now_v7();
    let post = NewPost::reply("user_1", "agreed", parent).unwrap();
    assert_eq!(post.reply_to_id, Some(parent));
  }

  #[test]
  fn post_with_author_flattens_post_fields() {
    let post = Post {
      id:          Uuid::now_v7(),
      author_id:   "user_1".into(),
      content:     "hello".into(),
      reply_to_id: None,
      created_at:  Utc::now(),
    };
    let author = Author {
      id:                "user_1".into(),
      username:          "ada".into(),
      first_name:        "Ada".into(),
      last_name:         "Lovelace".into(),
      profile_image_url: String::new(),
    };
    let json = serde_json::to_value(PostWithAuthor { post, author }).unwrap();
    assert_eq!(json["content"], "hello");
    assert_eq!(json["authorId"], "user_1");
    assert_eq!(json["author"]["username"], "ada");
  }
}
