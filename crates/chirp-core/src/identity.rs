//! The `IdentityProvider` trait: the hosted service that owns sign-in,
//! sessions, and canonical profile data.
//!
//! Implemented by `chirp-identity`. Nothing in Chirp stores credentials.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{post::Author, user::NewUser};

/// The identity provider caps list lookups at this many users.
pub const USER_LIST_LIMIT: usize = 100;

/// A user record as the identity provider returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
  pub id:         String,
  pub username:   Option<String>,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  #[serde(default)]
  pub image_url:  String,
}

impl IdentityUser {
  /// The public projection used on posts. `None` if the account has no
  /// username, since such a user cannot be shown as an author.
  pub fn to_author(&self) -> Option<Author> {
    Some(Author {
      id:                self.id.clone(),
      username:          self.username.clone()?,
      first_name:        self.first_name.clone().unwrap_or_default(),
      last_name:         self.last_name.clone().unwrap_or_default(),
      profile_image_url: self.image_url.clone(),
    })
  }

  /// The row to create the first time this account is seen locally.
  pub fn to_new_user(&self) -> Option<NewUser> {
    Some(NewUser {
      id:                self.id.clone(),
      username:          self.username.clone()?,
      first_name:        self.first_name.clone().unwrap_or_default(),
      last_name:         self.last_name.clone().unwrap_or_default(),
      profile_image_url: self.image_url.clone(),
    })
  }
}

/// Parameters for [`IdentityProvider::get_user_list`]. Conditions combine
/// as a union, matching the provider's list endpoint.
#[derive(Debug, Clone, Default)]
pub struct UserListFilter {
  pub user_ids:  Vec<String>,
  pub usernames: Vec<String>,
  pub limit:     Option<usize>,
}

/// Abstraction over the hosted identity provider.
pub trait IdentityProvider: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve a session id to the signed-in user's id. `None` if the session
  /// is unknown or no longer active.
  fn resolve_session<'a>(
    &'a self,
    session_id: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Fetch one user by id. `None` if the provider does not know it.
  fn get_user<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<IdentityUser>, Self::Error>> + Send + 'a;

  /// Fetch every user matching `filter`, up to its limit.
  fn get_user_list<'a>(
    &'a self,
    filter: &'a UserListFilter,
  ) -> impl Future<Output = Result<Vec<IdentityUser>, Self::Error>> + Send + 'a;
}
