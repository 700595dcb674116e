//! Handlers for `posts.*` procedures.
//!
//! | Procedure | Kind | Notes |
//! |-----------|------|-------|
//! | `posts.list` | query | `limit`, `cursor`, `authorId`/`userID`, `replyToId`; newest first |
//! | `posts.getByID` | query | `NOT_FOUND` if absent |
//! | `posts.create` | mutation | Session; rate limited |
//! | `posts.reply` | mutation | Session; rate limited; parent must exist |

use axum::{Json, extract::State};
use chirp_core::{
  enrich,
  identity::IdentityProvider,
  page::{MAX_LIMIT, Page, PostQuery, resolve_limit},
  post::{NewPost, Post, PostWithAuthor},
  ratelimit::RateLimiter,
  rpc::{CreatePostInput, GetPostInput, ListPostsInput, PostList, ReplyInput},
  store::SocialStore,
};

use crate::{
  AppState,
  auth::Session,
  error::ApiError,
  rpc::{RpcBody, RpcInput},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /posts.list?input={"limit":5,"cursor":"<id>"}`
pub async fn list<S, I, L>(
  State(state): State<AppState<S, I, L>>,
  RpcInput(input): RpcInput<ListPostsInput>,
) -> Result<Json<PostList>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  let limit = resolve_limit(input.limit).ok_or_else(|| {
    ApiError::BadRequest(format!("limit must be at most {MAX_LIMIT}"))
  })?;

  let query = PostQuery {
    cursor: input.cursor,
    author_id: input.author_id,
    reply_to_id: input.reply_to_id,
    ..PostQuery::page(limit)
  };
  let rows = state.store.list_posts(&query).await.map_err(ApiError::store)?;
  let page = Page::from_rows(rows, limit, |p| p.id);

  let posts = enrich::add_authors(state.identity.as_ref(), page.items).await?;
  Ok(Json(PostList { posts, next_cursor: page.next_cursor }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /posts.getByID?input={"id":"<id>"}`
pub async fn get_by_id<S, I, L>(
  State(state): State<AppState<S, I, L>>,
  RpcInput(input): RpcInput<GetPostInput>,
) -> Result<Json<PostWithAuthor>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  let post = state
    .store
    .get_post(input.id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
  Ok(Json(enrich::add_author(state.identity.as_ref(), post).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /posts.create` with body `{"content":"..."}`
pub async fn create<S, I, L>(
  State(state): State<AppState<S, I, L>>,
  session: Session,
  RpcBody(input): RpcBody<CreatePostInput>,
) -> Result<Json<Post>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  let new_post = NewPost::new(session.user_id.as_str(), input.content)?;
  publish(&state, &session, new_post).await.map(Json)
}

/// `POST /posts.reply` with body `{"content":"...","replyToId":"<id>"}`
pub async fn reply<S, I, L>(
  State(state): State<AppState<S, I, L>>,
  session: Session,
  RpcBody(input): RpcBody<ReplyInput>,
) -> Result<Json<Post>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  let new_post =
    NewPost::reply(session.user_id.as_str(), input.content, input.reply_to_id)?;
  if state
    .store
    .get_post(input.reply_to_id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::NotFound("Post not found".to_string()));
  }
  publish(&state, &session, new_post).await.map(Json)
}

/// Make sure the author row exists, rate-limit, then store `new_post`.
async fn publish<S, I, L>(
  state: &AppState<S, I, L>,
  session: &Session,
  new_post: NewPost,
) -> Result<Post, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  session.ensure_user(state).await?;

  let decision = state
    .limiter
    .limit(&session.user_id)
    .await
    .map_err(ApiError::limiter)?;
  if !decision.allowed {
    tracing::warn!(user_id = %session.user_id, "post rate limit exceeded");
    return Err(ApiError::TooManyRequests { retry_after: decision.reset });
  }

  let post = state.store.create_post(new_post).await.map_err(ApiError::store)?;
  tracing::info!(
    post_id = %post.id,
    author_id = %post.author_id,
    reply_to_id = ?post.reply_to_id,
    "post created"
  );
  Ok(post)
}
