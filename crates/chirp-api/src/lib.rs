//! RPC API for Chirp.
//!
//! Exposes an axum [`Router`] with one route per procedure, backed by any
//! [`SocialStore`], [`IdentityProvider`], and [`RateLimiter`]. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/rpc", chirp_api::api_router(state))
//! ```
//!
//! Queries are `GET /<procedure>?input=<json>`; mutations are
//! `POST /<procedure>` with a JSON body.

pub mod auth;
pub mod error;
pub mod posts;
pub mod profile;
pub mod rpc;

mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use chirp_core::{
  identity::IdentityProvider, ratelimit::RateLimiter, rpc::procedure,
  store::SocialStore,
};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct AppState<S, I, L> {
  pub store:    Arc<S>,
  pub identity: Arc<I>,
  pub limiter:  Arc<L>,
}

// Derived `Clone` would demand `S: Clone` and friends.
impl<S, I, L> Clone for AppState<S, I, L> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      identity: Arc::clone(&self.identity),
      limiter:  Arc::clone(&self.limiter),
    }
  }
}

impl<S, I, L> AppState<S, I, L> {
  pub fn new(store: S, identity: I, limiter: L) -> Self {
    Self {
      store:    Arc::new(store),
      identity: Arc::new(identity),
      limiter:  Arc::new(limiter),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, I, L>(state: AppState<S, I, L>) -> Router<()>
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  let at = |name: &str| format!("/{name}");

  Router::new()
    // Posts
    .route(&at(procedure::POSTS_LIST), get(posts::list::<S, I, L>))
    .route(&at(procedure::POSTS_GET_BY_ID), get(posts::get_by_id::<S, I, L>))
    .route(&at(procedure::POSTS_CREATE), post(posts::create::<S, I, L>))
    .route(&at(procedure::POSTS_REPLY), post(posts::reply::<S, I, L>))
    // Profiles
    .route(
      &at(procedure::PROFILE_GET_BY_USERNAME),
      get(profile::get_by_username::<S, I, L>),
    )
    .route(
      &at(procedure::PROFILE_GET_BY_USERNAME_WITH_FOLLOWERS),
      get(profile::get_by_username_with_followers::<S, I, L>),
    )
    .route(
      &at(procedure::PROFILE_GET_LOGGED_IN_USER),
      get(profile::get_logged_in_user::<S, I, L>),
    )
    .route(&at(procedure::PROFILE_EDIT), post(profile::edit::<S, I, L>))
    .route(&at(procedure::PROFILE_FOLLOW), post(profile::follow::<S, I, L>))
    .route(&at(procedure::PROFILE_UNFOLLOW), post(profile::unfollow::<S, I, L>))
    .with_state(state)
}
