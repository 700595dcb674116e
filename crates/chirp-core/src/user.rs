//! Users: local mirrors of identity-provider accounts.
//!
//! A user row is created lazily the first time the account is seen (an
//! authenticated call or a username lookup) and afterwards only changes
//! through a profile edit.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const NAME_MAX_CHARS: usize = 63;
pub const DESCRIPTION_MAX_CHARS: usize = 511;

/// A user as stored locally. `id` is the identity provider's subject id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:                String,
  pub username:          String,
  pub first_name:        String,
  pub last_name:         String,
  pub profile_image_url: String,
  pub description:       String,
}

/// Input to [`crate::store::SocialStore::upsert_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub id:                String,
  pub username:          String,
  pub first_name:        String,
  pub last_name:         String,
  pub profile_image_url: String,
}

impl NewUser {
  pub fn into_user(self) -> User {
    User {
      id:                self.id,
      username:          self.username,
      first_name:        self.first_name,
      last_name:         self.last_name,
      profile_image_url: self.profile_image_url,
      description:       String::new(),
    }
  }
}

/// The editable part of a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
  pub first_name:  String,
  pub last_name:   String,
  pub description: String,
}

impl ProfileUpdate {
  /// Names must be 1–63 characters, the description at most 511.
  pub fn validate(&self) -> Result<()> {
    check_len("firstName", &self.first_name, 1, NAME_MAX_CHARS)?;
    check_len("lastName", &self.last_name, 1, NAME_MAX_CHARS)?;
    check_len("description", &self.description, 0, DESCRIPTION_MAX_CHARS)
  }
}

fn check_len(field: &'static str, value: &str, min: usize, max: usize) -> Result<()> {
  let len = value.chars().count();
  if len < min || len > max {
    return Err(Error::InvalidField { field, min, max });
  }
  Ok(())
}

/// A user together with both sides of their follow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithFollows {
  #[serde(flatten)]
  pub user:        User,
  /// Users this user follows, most recent edge first.
  pub following:   Vec<User>,
  /// Users following this user, most recent edge first.
  pub followed_by: Vec<User>,
}
