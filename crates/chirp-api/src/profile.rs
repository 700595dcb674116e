//! Handlers for `profile.*` procedures.
//!
//! | Procedure | Kind | Notes |
//! |-----------|------|-------|
//! | `profile.getByUsername` | query | Creates the local row on first lookup |
//! | `profile.getByUsernameWithFollowers` | query | Adds `following` / `followedBy` |
//! | `profile.getLoggedInUser` | query | Session |
//! | `profile.edit` | mutation | Session; only your own profile |
//! | `profile.follow` | mutation | Session; idempotent |
//! | `profile.unfollow` | mutation | Session; idempotent |

use axum::{Json, extract::State};
use chirp_core::{
  identity::IdentityProvider,
  ratelimit::RateLimiter,
  rpc::{EditProfileInput, FollowInput, FollowState, UsernameInput},
  store::SocialStore,
  user::{ProfileUpdate, User, UserWithFollows},
};

use crate::{
  AppState,
  auth::Session,
  error::ApiError,
  rpc::{RpcBody, RpcInput},
  users::{load_user, load_user_by_username},
};

const USER_NOT_FOUND: &str = "Could not find user with that username";

// ─── Lookup ───────────────────────────────────────────────────────────────────

/// `GET /profile.getByUsername?input={"username":"..."}`
pub async fn get_by_username<S, I, L>(
  State(state): State<AppState<S, I, L>>,
  RpcInput(input): RpcInput<UsernameInput>,
) -> Result<Json<User>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  let user = load_user_by_username(&state, &input.username)
    .await?
    .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;
  Ok(Json(user))
}

/// `GET /profile.getByUsernameWithFollowers?input={"username":"..."}`
pub async fn get_by_username_with_followers<S, I, L>(
  State(state): State<AppState<S, I, L>>,
  RpcInput(input): RpcInput<UsernameInput>,
) -> Result<Json<UserWithFollows>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  let user = load_user_by_username(&state, &input.username)
    .await?
    .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

  let following = state
    .store
    .list_following(&user.id)
    .await
    .map_err(ApiError::store)?;
  let followed_by = state
    .store
    .list_followers(&user.id)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(UserWithFollows { user, following, followed_by }))
}

/// `GET /profile.getLoggedInUser`
pub async fn get_logged_in_user<S, I, L>(
  State(state): State<AppState<S, I, L>>,
  session: Session,
) -> Result<Json<User>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  Ok(Json(session.ensure_user(&state).await?))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

/// `POST /profile.edit` with body `{"userId","firstName","lastName","description"}`
pub async fn edit<S, I, L>(
  State(state): State<AppState<S, I, L>>,
  session: Session,
  RpcBody(input): RpcBody<EditProfileInput>,
) -> Result<Json<User>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  if input.user_id != session.user_id {
    return Err(ApiError::Unauthorized(
      "You can only edit your own profile".to_string(),
    ));
  }

  let update = ProfileUpdate {
    first_name:  input.first_name,
    last_name:   input.last_name,
    description: input.description,
  };
  update.validate()?;
  session.ensure_user(&state).await?;

  let user = state
    .store
    .update_profile(&session.user_id, update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
  tracing::info!(user_id = %user.id, "profile updated");
  Ok(Json(user))
}

// ─── Follow edges ─────────────────────────────────────────────────────────────

/// `POST /profile.follow` with body `{"userId":"..."}`
pub async fn follow<S, I, L>(
  State(state): State<AppState<S, I, L>>,
  session: Session,
  RpcBody(input): RpcBody<FollowInput>,
) -> Result<Json<FollowState>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  if input.user_id == session.user_id {
    return Err(chirp_core::Error::SelfFollow.into());
  }
  let target = resolve_target(&state, &session, &input.user_id).await?;

  let added = state
    .store
    .follow(&session.user_id, &target.id)
    .await
    .map_err(ApiError::store)?;
  if added {
    tracing::info!(follower = %session.user_id, followee = %target.id, "follow added");
  }
  Ok(Json(FollowState { user_id: target.id, following: true }))
}

/// `POST /profile.unfollow` with body `{"userId":"..."}`
pub async fn unfollow<S, I, L>(
  State(state): State<AppState<S, I, L>>,
  session: Session,
  RpcBody(input): RpcBody<FollowInput>,
) -> Result<Json<FollowState>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  if input.user_id == session.user_id {
    return Err(chirp_core::Error::SelfUnfollow.into());
  }
  let target = resolve_target(&state, &session, &input.user_id).await?;

  let removed = state
    .store
    .unfollow(&session.user_id, &target.id)
    .await
    .map_err(ApiError::store)?;
  if removed {
    tracing::info!(follower = %session.user_id, followee = %target.id, "follow removed");
  }
  Ok(Json(FollowState { user_id: target.id, following: false }))
}

/// Ensure both endpoints of an edge exist locally; the target must be known.
async fn resolve_target<S, I, L>(
  state: &AppState<S, I, L>,
  session: &Session,
  target_id: &str,
) -> Result<User, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  let target = load_user(state, target_id)
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
  session.ensure_user(state).await?;
  Ok(target)
}
