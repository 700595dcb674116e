//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings; the latter keeps UUIDv7 text order equal to time order.

use chirp_core::{post::Post, user::User};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str =
  "user_id, username, first_name, last_name, profile_image_url, description";

/// Column list for `users` with each name qualified by `alias`.
pub fn user_columns(alias: &str) -> String {
  USER_COLUMNS
    .split(", ")
    .map(|c| format!("{alias}.{c}"))
    .collect::<Vec<_>>()
    .join(", ")
}

/// A `users` row. Every column is plain text, so this maps straight onto
/// [`User`].
pub fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    id:                row.get(0)?,
    username:          row.get(1)?,
    first_name:        row.get(2)?,
    last_name:         row.get(3)?,
    profile_image_url: row.get(4)?,
    description:       row.get(5)?,
  })
}

pub const POST_COLUMNS: &str =
  "post_id, author_id, content, reply_to_id, created_at";

/// Raw strings read directly from a `posts` row.
pub struct RawPost {
  pub post_id:     String,
  pub author_id:   String,
  pub content:     String,
  pub reply_to_id: Option<String>,
  pub created_at:  String,
}

impl RawPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:     row.get(0)?,
      author_id:   row.get(1)?,
      content:     row.get(2)?,
      reply_to_id: row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:          decode_uuid(&self.post_id)?,
      author_id:   self.author_id,
      content:     self.content,
      reply_to_id: self.reply_to_id.as_deref().map(decode_uuid).transpose()?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
