//! The RPC contract shared by `chirp-api` and `chirp-client`.
//!
//! Every procedure's input and output type lives here so that both ends of
//! the wire agree on field names (camelCase) and optionality.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::post::PostWithAuthor;

// ─── Procedure names ─────────────────────────────────────────────────────────

pub mod procedure {
  pub const POSTS_LIST: &str = "posts.list";
  pub const POSTS_GET_BY_ID: &str = "posts.getByID";
  pub const POSTS_CREATE: &str = "posts.create";
  pub const POSTS_REPLY: &str = "posts.reply";
  pub const PROFILE_GET_BY_USERNAME: &str = "profile.getByUsername";
  pub const PROFILE_GET_BY_USERNAME_WITH_FOLLOWERS: &str =
    "profile.getByUsernameWithFollowers";
  pub const PROFILE_GET_LOGGED_IN_USER: &str = "profile.getLoggedInUser";
  pub const PROFILE_EDIT: &str = "profile.edit";
  pub const PROFILE_FOLLOW: &str = "profile.follow";
  pub const PROFILE_UNFOLLOW: &str = "profile.unfollow";
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// The kind of a failed call, as carried in the error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
  BadRequest,
  Unauthorized,
  NotFound,
  TooManyRequests,
  InternalServerError,
}

impl ErrorCode {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::BadRequest => "BAD_REQUEST",
      Self::Unauthorized => "UNAUTHORIZED",
      Self::NotFound => "NOT_FOUND",
      Self::TooManyRequests => "TOO_MANY_REQUESTS",
      Self::InternalServerError => "INTERNAL_SERVER_ERROR",
    }
  }

  pub fn http_status(self) -> u16 {
    match self {
      Self::BadRequest => 400,
      Self::Unauthorized => 401,
      Self::NotFound => 404,
      Self::TooManyRequests => 429,
      Self::InternalServerError => 500,
    }
  }
}

/// `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
  pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
  pub code:    ErrorCode,
  pub message: String,
}

// ─── posts.* ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsInput {
  pub limit:       Option<usize>,
  pub cursor:      Option<Uuid>,
  #[serde(alias = "userID")]
  pub author_id:   Option<String>,
  pub reply_to_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostList {
  pub posts:       Vec<PostWithAuthor>,
  pub next_cursor: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPostInput {
  pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
  pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyInput {
  pub content:     String,
  pub reply_to_id: Uuid,
}

// ─── profile.* ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsernameInput {
  pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditProfileInput {
  pub user_id:     String,
  pub first_name:  String,
  pub last_name:   String,
  #[serde(default)]
  pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowInput {
  pub user_id: String,
}

/// The edge state after a follow or unfollow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowState {
  pub user_id:   String,
  pub following: bool,
}
