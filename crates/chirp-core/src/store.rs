//! The `SocialStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `chirp-store-sqlite`).
//! Higher layers (`chirp-api`, `chirp-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  page::PostQuery,
  post::{NewPost, Post},
  user::{NewUser, ProfileUpdate, User},
};

/// Abstraction over a Chirp persistence backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SocialStore: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Insert `input` unless a user with the same id already exists, and
  /// return the stored row either way.
  fn upsert_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Retrieve a user by username. Returns `None` if not found.
  fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Overwrite the editable profile fields. Returns `None` if the user does
  /// not exist.
  fn update_profile<'a>(
    &'a self,
    id: &'a str,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Persist a new post. The id and `created_at` are assigned by the store.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Retrieve a post by id. Returns `None` if not found.
  fn get_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Return up to `query.take` posts, newest first, starting at
  /// `query.cursor` inclusive.
  fn list_posts<'a>(
    &'a self,
    query: &'a PostQuery,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + 'a;

  // ── Follow edges ──────────────────────────────────────────────────────

  /// Record that `follower_id` follows `followee_id`. Returns `false` if the
  /// edge already existed.
  fn follow<'a>(
    &'a self,
    follower_id: &'a str,
    followee_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove the edge. Returns `false` if there was none.
  fn unfollow<'a>(
    &'a self,
    follower_id: &'a str,
    followee_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Users that `user_id` follows, most recent edge first.
  fn list_following<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;

  /// Users following `user_id`, most recent edge first.
  fn list_followers<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;
}
