//! [`StaticIdentity`]: a fixed, in-memory identity directory.

use std::{collections::HashMap, convert::Infallible};

use chirp_core::identity::{IdentityProvider, IdentityUser, UserListFilter};

/// An identity provider whose users and sessions are fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
  users:    Vec<IdentityUser>,
  /// session id → user id
  sessions: HashMap<String, String>,
}

impl StaticIdentity {
  pub fn new() -> Self { Self::default() }

  pub fn with_user(mut self, user: IdentityUser) -> Self {
    self.users.push(user);
    self
  }

  /// Register an active session for `user_id`.
  pub fn with_session(
    mut self,
    session_id: impl Into<String>,
    user_id: impl Into<String>,
  ) -> Self {
    self.sessions.insert(session_id.into(), user_id.into());
    self
  }
}

impl IdentityProvider for StaticIdentity {
  type Error = Infallible;

  async fn resolve_session(&self, session_id: &str) -> Result<Option<String>, Infallible> {
    Ok(self.sessions.get(session_id).cloned())
  }

  async fn get_user(&self, user_id: &str) -> Result<Option<IdentityUser>, Infallible> {
    Ok(self.users.iter().find(|u| u.id == user_id).cloned())
  }

  async fn get_user_list(
    &self,
    filter: &UserListFilter,
  ) -> Result<Vec<IdentityUser>, Infallible> {
    let matches = self.users.iter().filter(|u| {
      filter.user_ids.contains(&u.id)
        || u
          .username
          .as_ref()
          .is_some_and(|name| filter.usernames.contains(name))
    });
    Ok(
      matches
        .take(filter.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(id: &str, username: &str) -> IdentityUser {
    IdentityUser {
      id:         id.into(),
      username:   Some(username.into()),
      first_name: None,
      last_name:  None,
      image_url:  String::new(),
    }
  }

  fn directory() -> StaticIdentity {
    StaticIdentity::new()
      .with_user(user("user_a", "alice"))
      .with_user(user("user_b", "bob"))
      .with_user(user("user_c", "carol"))
      .with_session("sess_a", "user_a")
  }

  #[tokio::test]
  async fn sessions_resolve_to_users() {
    let dir = directory();
    assert_eq!(
      dir.resolve_session("sess_a").await.unwrap().as_deref(),
      Some("user_a")
    );
    assert!(dir.resolve_session("sess_x").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn list_is_a_union_with_limit() {
    let dir = directory();
    let filter = UserListFilter {
      user_ids:  vec!["user_c".into()],
      usernames: vec!["alice".into(), "bob".into()],
      limit:     Some(2),
    };
    let ids: Vec<_> = dir
      .get_user_list(&filter)
      .await
      .unwrap()
      .into_iter()
      .map(|u| u.id)
      .collect();
    assert_eq!(ids, ["user_a", "user_b"]);
  }
}
