//! [`SqliteStore`]: the SQLite implementation of [`SocialStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use chirp_core::{
  page::PostQuery,
  post::{NewPost, Post},
  store::SocialStore,
  user::{NewUser, ProfileUpdate, User},
};

use crate::{
  Error, Result,
  encode::{
    POST_COLUMNS, RawPost, USER_COLUMNS, encode_dt, encode_uuid, user_columns,
    user_from_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Chirp store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT` returning user rows, with `?1` bound to `user_id`.
  async fn query_users(&self, sql: String, user_id: &str) -> Result<Vec<User>> {
    let id = user_id.to_owned();
    let users = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id], user_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(users)
  }

  async fn query_user(&self, column: &'static str, value: &str) -> Result<Option<User>> {
    let value = value.to_owned();
    let user = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
              rusqlite::params![value],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(user)
  }
}

// ─── SocialStore impl ────────────────────────────────────────────────────────

impl SocialStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn upsert_user(&self, input: NewUser) -> Result<User> {
    let user_id = input.id.clone();

    let stored: Option<User> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, first_name, last_name, profile_image_url)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(user_id) DO NOTHING",
          rusqlite::params![
            input.id,
            input.username,
            input.first_name,
            input.last_name,
            input.profile_image_url,
          ],
        )?;
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![input.id],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    stored.ok_or(Error::UserVanished(user_id))
  }

  async fn get_user(&self, id: &str) -> Result<Option<User>> {
    self.query_user("user_id", id).await
  }

  async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
    self.query_user("username", username).await
  }

  async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<Option<User>> {
    let id_str = id.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE users SET first_name = ?1, last_name = ?2, description = ?3
           WHERE user_id = ?4",
          rusqlite::params![
            update.first_name,
            update.last_name,
            update.description,
            id_str,
          ],
        )?;
        Ok(n)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    tracing::debug!(user_id = id, "profile updated");
    self.get_user(id).await
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let post = Post {
      id:          Uuid::now_v7(),
      author_id:   input.author_id,
      content:     input.content,
      reply_to_id: input.reply_to_id,
      created_at:  Utc::now(),
    };

    let id_str       = encode_uuid(post.id);
    let author_id    = post.author_id.clone();
    let content      = post.content.clone();
    let reply_to_str = post.reply_to_id.map(encode_uuid);
    let at_str       = encode_dt(post.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (post_id, author_id, content, reply_to_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, author_id, content, reply_to_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(post)
  }

  async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {POST_COLUMNS} FROM posts WHERE post_id = ?1"),
              rusqlite::params![id_str],
              RawPost::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>> {
    let cursor_str   = query.cursor.map(encode_uuid);
    let author_id    = query.author_id.clone();
    let reply_to_str = query.reply_to_id.map(encode_uuid);
    let take         = i64::try_from(query.take).unwrap_or(i64::MAX);

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLUMNS} FROM posts
           WHERE (?1 IS NULL OR post_id <= ?1)
             AND (?2 IS NULL OR author_id = ?2)
             AND (?3 IS NULL OR reply_to_id = ?3)
           ORDER BY post_id DESC
           LIMIT ?4"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![cursor_str, author_id, reply_to_str, take],
            RawPost::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  // ── Follow edges ──────────────────────────────────────────────────────────

  async fn follow(&self, follower_id: &str, followee_id: &str) -> Result<bool> {
    let follower = follower_id.to_owned();
    let followee = followee_id.to_owned();
    let at_str   = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO follows (follower_id, followee_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![follower, followee, at_str],
        )?;
        Ok(n == 1)
      })
      .await?;

    Ok(inserted)
  }

  async fn unfollow(&self, follower_id: &str, followee_id: &str) -> Result<bool> {
    let follower = follower_id.to_owned();
    let followee = followee_id.to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
          rusqlite::params![follower, followee],
        )?;
        Ok(n == 1)
      })
      .await?;

    Ok(removed)
  }

  async fn list_following(&self, user_id: &str) -> Result<Vec<User>> {
    let sql = format!(
      "SELECT {} FROM follows f
       JOIN users u ON u.user_id = f.followee_id
       WHERE f.follower_id = ?1
       ORDER BY f.rowid DESC",
      user_columns("u"),
    );
    self.query_users(sql, user_id).await
  }

  async fn list_followers(&self, user_id: &str) -> Result<Vec<User>> {
    let sql = format!(
      "SELECT {} FROM follows f
       JOIN users u ON u.user_id = f.follower_id
       WHERE f.followee_id = ?1
       ORDER BY f.rowid DESC",
      user_columns("u"),
    );
    self.query_users(sql, user_id).await
  }
}
