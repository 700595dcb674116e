//! End-to-end tests against the real API router on an ephemeral port.

use std::time::Duration;

use axum::Router;
use chirp_api::{AppState, api_router};
use chirp_core::{
  identity::IdentityUser,
  rpc::{EditProfileInput, ErrorCode, ListPostsInput},
};
use chirp_identity::StaticIdentity;
use chirp_ratelimit::MemoryLimiter;
use chirp_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::{ApiClient, ApiConfig, Error};

fn identity_user(id: &str, username: &str) -> IdentityUser {
  IdentityUser {
    id:         id.into(),
    username:   Some(username.into()),
    first_name: Some("First".into()),
    last_name:  Some("Last".into()),
    image_url:  String::new(),
  }
}

/// Serve a fresh API and return an anonymous client for it.
async fn spawn_server() -> ApiClient {
  let state = AppState::new(
    SqliteStore::open_in_memory().await.unwrap(),
    StaticIdentity::new()
      .with_user(identity_user("user_a", "alice"))
      .with_user(identity_user("user_b", "bob"))
      .with_session("sess_a", "user_a")
      .with_session("sess_b", "user_b"),
    MemoryLimiter::new(3, Duration::from_secs(60)),
  );
  let app = Router::new().nest("/rpc", api_router(state));

  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

  ApiClient::new(ApiConfig {
    base_url:      format!("http://{addr}/"),
    session_token: None,
  })
  .unwrap()
}

#[tokio::test]
async fn post_and_read_back() {
  let anon = spawn_server().await;
  let alice = anon.with_session("sess_a");

  let post = alice.create_post("first chirp").await.unwrap();
  assert_eq!(post.author_id, "user_a");

  let page = anon.list_posts(&ListPostsInput::default()).await.unwrap();
  assert_eq!(page.posts.len(), 1);
  assert_eq!(page.posts[0].author.username, "alice");
  assert!(page.next_cursor.is_none());

  let one = anon.get_post(post.id).await.unwrap();
  assert_eq!(one.post, post);

  let reply = anon.with_session("sess_b").reply(post.id, "welcome").await.unwrap();
  assert_eq!(reply.reply_to_id, Some(post.id));
}

#[tokio::test]
async fn pagination_round_trip() {
  let anon = spawn_server().await;
  let alice = anon.with_session("sess_a");
  let bob = anon.with_session("sess_b");
  for i in 0..3 {
    alice.create_post(format!("a{i}")).await.unwrap();
    bob.create_post(format!("b{i}")).await.unwrap();
  }

  let first = anon
    .list_posts(&ListPostsInput { limit: Some(4), ..ListPostsInput::default() })
    .await
    .unwrap();
  assert_eq!(first.posts.len(), 4);
  let cursor = first.next_cursor.unwrap();

  let second = anon
    .list_posts(&ListPostsInput {
      limit: Some(4),
      cursor: Some(cursor),
      ..ListPostsInput::default()
    })
    .await
    .unwrap();
  assert_eq!(second.posts.len(), 2);
  assert_eq!(second.posts[0].post.id, cursor);
  assert!(second.next_cursor.is_none());
}

#[tokio::test]
async fn typed_errors_surface() {
  let anon = spawn_server().await;

  let err = anon.create_post("hi").await.unwrap_err();
  assert_eq!(err.code(), Some(ErrorCode::Unauthorized));

  let err = anon.get_post(Uuid::now_v7()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Rpc { code: ErrorCode::NotFound, ref message } if message == "Post not found"
  ));

  let alice = anon.with_session("sess_a");
  for i in 0..3 {
    alice.create_post(format!("post {i}")).await.unwrap();
  }
  let err = alice.create_post("too many").await.unwrap_err();
  assert_eq!(err.code(), Some(ErrorCode::TooManyRequests));
}

#[tokio::test]
async fn profile_and_follow_flow() {
  let anon = spawn_server().await;
  let alice = anon.with_session("sess_a");

  let me = alice.logged_in_user().await.unwrap();
  assert_eq!(me.username, "alice");

  let edited = alice
    .edit_profile(&EditProfileInput {
      user_id:     "user_a".into(),
      first_name:  "Alice".into(),
      last_name:   "Liddell".into(),
      description: "hello".into(),
    })
    .await
    .unwrap();
  assert_eq!(edited.first_name, "Alice");

  let state = alice.follow("user_b").await.unwrap();
  assert!(state.following);

  let bob = anon.get_profile_with_followers("bob").await.unwrap();
  assert_eq!(bob.followed_by.len(), 1);
  assert_eq!(bob.followed_by[0].id, "user_a");

  let state = alice.unfollow("user_b").await.unwrap();
  assert!(!state.following);
  let bob = anon.get_profile("bob").await.unwrap();
  assert_eq!(bob.id, "user_b");

  let err = alice.follow("user_a").await.unwrap_err();
  assert_eq!(err.code(), Some(ErrorCode::BadRequest));
}
