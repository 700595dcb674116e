//! SQL schema for the Chirp SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Mirrors of identity-provider accounts, created on first sight.
CREATE TABLE IF NOT EXISTS users (
    user_id           TEXT PRIMARY KEY,  -- identity-provider subject id
    username          TEXT NOT NULL UNIQUE,
    first_name        TEXT NOT NULL,
    last_name         TEXT NOT NULL,
    profile_image_url TEXT NOT NULL,
    description       TEXT NOT NULL DEFAULT ''
);

-- Posts are immutable. post_id is a UUIDv7, so its text order is
-- creation order.
CREATE TABLE IF NOT EXISTS posts (
    post_id     TEXT PRIMARY KEY,
    author_id   TEXT NOT NULL REFERENCES users(user_id),
    content     TEXT NOT NULL,
    reply_to_id TEXT REFERENCES posts(post_id),
    created_at  TEXT NOT NULL           -- ISO 8601 UTC; server-assigned
);

-- One row per directed edge; both sides of the relation read from it.
CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL REFERENCES users(user_id),
    followee_id TEXT NOT NULL REFERENCES users(user_id),
    created_at  TEXT NOT NULL,
    PRIMARY KEY (follower_id, followee_id),
    CHECK (follower_id != followee_id)
);

CREATE INDEX IF NOT EXISTS posts_author_idx    ON posts(author_id, post_id);
CREATE INDEX IF NOT EXISTS posts_reply_idx     ON posts(reply_to_id, post_id);
CREATE INDEX IF NOT EXISTS follows_followee_idx ON follows(followee_id);

PRAGMA user_version = 1;
";
