//! Local user rows are created lazily from identity-provider records.

use chirp_core::{
  identity::{IdentityProvider, UserListFilter},
  ratelimit::RateLimiter,
  store::SocialStore,
  user::User,
};

use crate::{AppState, error::ApiError};

/// The stored user `id`, created from the identity provider on first sight.
/// `None` if neither side knows the id or the provider record has no username.
pub(crate) async fn load_user<S, I, L>(
  state: &AppState<S, I, L>,
  id: &str,
) -> Result<Option<User>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  if let Some(user) = state.store.get_user(id).await.map_err(ApiError::store)? {
    return Ok(Some(user));
  }

  let Some(new_user) = state
    .identity
    .get_user(id)
    .await
    .map_err(ApiError::identity)?
    .and_then(|u| u.to_new_user())
  else {
    return Ok(None);
  };

  tracing::info!(user_id = %new_user.id, username = %new_user.username, "creating local user");
  let user = state.store.upsert_user(new_user).await.map_err(ApiError::store)?;
  Ok(Some(user))
}

/// Like [`load_user`] but keyed by username.
pub(crate) async fn load_user_by_username<S, I, L>(
  state: &AppState<S, I, L>,
  username: &str,
) -> Result<Option<User>, ApiError>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  if let Some(user) = state
    .store
    .get_user_by_username(username)
    .await
    .map_err(ApiError::store)?
  {
    return Ok(Some(user));
  }

  let filter = UserListFilter {
    usernames: vec![username.to_owned()],
    limit: Some(1),
    ..UserListFilter::default()
  };
  let Some(new_user) = state
    .identity
    .get_user_list(&filter)
    .await
    .map_err(ApiError::identity)?
    .first()
    .and_then(|u| u.to_new_user())
  else {
    return Ok(None);
  };

  tracing::info!(user_id = %new_user.id, username = %new_user.username, "creating local user");
  let user = state.store.upsert_user(new_user).await.map_err(ApiError::store)?;
  Ok(Some(user))
}
