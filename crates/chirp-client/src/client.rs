//! [`ApiClient`]: async HTTP client wrapping the Chirp RPC API.

use std::time::Duration;

use chirp_core::{
  post::{Post, PostWithAuthor},
  rpc::{
    CreatePostInput, EditProfileInput, ErrorBody, FollowInput, FollowState,
    GetPostInput, ListPostsInput, PostList, ReplyInput, UsernameInput, procedure,
  },
  user::{User, UserWithFollows},
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

/// Connection settings for the Chirp API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Server root, without the `/rpc` suffix.
  pub base_url:      String,
  /// Identity-provider session id, sent as a bearer token.
  pub session_token: Option<String>,
}

/// Async HTTP client for the Chirp RPC API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  /// A copy of this client acting under another session.
  pub fn with_session(&self, session_token: impl Into<String>) -> Self {
    let mut config = self.config.clone();
    config.session_token = Some(session_token.into());
    Self { client: self.client.clone(), config }
  }

  fn url(&self, procedure: &str) -> String {
    format!(
      "{}/rpc/{}",
      self.config.base_url.trim_end_matches('/'),
      procedure
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.session_token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// `GET /rpc/<procedure>?input=<json>`
  async fn query<I, O>(&self, procedure: &str, input: &I) -> Result<O>
  where
    I: Serialize + ?Sized,
    O: DeserializeOwned,
  {
    let input = serde_json::to_string(input)?;
    tracing::debug!(procedure, "rpc query");
    let resp = self
      .auth(self.client.get(self.url(procedure)))
      .query(&[("input", input)])
      .send()
      .await?;
    decode(resp).await
  }

  /// `POST /rpc/<procedure>` with a JSON body.
  async fn mutate<I, O>(&self, procedure: &str, input: &I) -> Result<O>
  where
    I: Serialize + ?Sized,
    O: DeserializeOwned,
  {
    tracing::debug!(procedure, "rpc mutation");
    let resp = self
      .auth(self.client.post(self.url(procedure)))
      .json(input)
      .send()
      .await?;
    decode(resp).await
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  pub async fn list_posts(&self, input: &ListPostsInput) -> Result<PostList> {
    self.query(procedure::POSTS_LIST, input).await
  }

  pub async fn get_post(&self, id: Uuid) -> Result<PostWithAuthor> {
    self.query(procedure::POSTS_GET_BY_ID, &GetPostInput { id }).await
  }

  pub async fn create_post(&self, content: impl Into<String>) -> Result<Post> {
    let input = CreatePostInput { content: content.into() };
    self.mutate(procedure::POSTS_CREATE, &input).await
  }

  pub async fn reply(&self, reply_to_id: Uuid, content: impl Into<String>) -> Result<Post> {
    let input = ReplyInput { content: content.into(), reply_to_id };
    self.mutate(procedure::POSTS_REPLY, &input).await
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  pub async fn get_profile(&self, username: impl Into<String>) -> Result<User> {
    let input = UsernameInput { username: username.into() };
    self.query(procedure::PROFILE_GET_BY_USERNAME, &input).await
  }

  pub async fn get_profile_with_followers(
    &self,
    username: impl Into<String>,
  ) -> Result<UserWithFollows> {
    let input = UsernameInput { username: username.into() };
    self
      .query(procedure::PROFILE_GET_BY_USERNAME_WITH_FOLLOWERS, &input)
      .await
  }

  pub async fn logged_in_user(&self) -> Result<User> {
    self
      .query(procedure::PROFILE_GET_LOGGED_IN_USER, &serde_json::Map::new())
      .await
  }

  pub async fn edit_profile(&self, input: &EditProfileInput) -> Result<User> {
    self.mutate(procedure::PROFILE_EDIT, input).await
  }

  pub async fn follow(&self, user_id: impl Into<String>) -> Result<FollowState> {
    let input = FollowInput { user_id: user_id.into() };
    self.mutate(procedure::PROFILE_FOLLOW, &input).await
  }

  pub async fn unfollow(&self, user_id: impl Into<String>) -> Result<FollowState> {
    let input = FollowInput { user_id: user_id.into() };
    self.mutate(procedure::PROFILE_UNFOLLOW, &input).await
  }
}

/// Parse a success body as `O`, or an error body into [`Error::Rpc`].
async fn decode<O: DeserializeOwned>(resp: Response) -> Result<O> {
  let status = resp.status();
  let bytes = resp.bytes().await?;
  if status.is_success() {
    return Ok(serde_json::from_slice(&bytes)?);
  }
  match serde_json::from_slice::<ErrorBody>(&bytes) {
    Ok(body) => Err(Error::Rpc {
      code:    body.error.code,
      message: body.error.message,
    }),
    Err(_) => Err(Error::Status(status)),
  }
}
