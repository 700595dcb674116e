//! Joining posts to their authors' identity-provider profiles.
//!
//! Enrichment is all-or-nothing: a post whose author cannot be resolved fails
//! the whole batch rather than producing a partial or placeholder result.

use std::collections::HashMap;

use crate::{
  Error, Result,
  identity::{IdentityProvider, IdentityUser, USER_LIST_LIMIT, UserListFilter},
  post::{Author, Post, PostWithAuthor},
};

/// Attach authors to a batch of posts with a single list lookup.
pub async fn add_authors<I: IdentityProvider>(
  identity: &I,
  posts: Vec<Post>,
) -> Result<Vec<PostWithAuthor>> {
  if posts.is_empty() {
    return Ok(Vec::new());
  }

  let mut user_ids: Vec<String> =
    posts.iter().map(|p| p.author_id.clone()).collect();
  user_ids.sort_unstable();
  user_ids.dedup();

  let filter = UserListFilter {
    user_ids,
    usernames: Vec::new(),
    limit: Some(USER_LIST_LIMIT),
  };
  let authors: HashMap<String, Author> = identity
    .get_user_list(&filter)
    .await
    .map_err(|e| Error::Identity(Box::new(e)))?
    .iter()
    .filter_map(IdentityUser::to_author)
    .map(|a| (a.id.clone(), a))
    .collect();

  posts
    .into_iter()
    .map(|post| {
      let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
        Error::MissingAuthor {
          post_id:   post.id,
          author_id: post.author_id.clone(),
        }
      })?;
      Ok(PostWithAuthor { post, author })
    })
    .collect()
}

/// Attach the author to a single post.
pub async fn add_author<I: IdentityProvider>(
  identity: &I,
  post: Post,
) -> Result<PostWithAuthor> {
  let author = identity
    .get_user(&post.author_id)
    .await
    .map_err(|e| Error::Identity(Box::new(e)))?
    .as_ref()
    .and_then(IdentityUser::to_author);

  match author {
    Some(author) => Ok(PostWithAuthor { post, author }),
    None => Err(Error::MissingAuthor {
      post_id:   post.id,
      author_id: post.author_id,
    }),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  /// A fixed directory that counts list calls.
  struct Directory {
    users:      Vec<IdentityUser>,
    list_calls: AtomicUsize,
  }

  impl Directory {
    fn new(users: Vec<IdentityUser>) -> Self {
      Self { users, list_calls: AtomicUsize::new(0) }
    }
  }

  impl IdentityProvider for Directory {
    type Error = std::convert::Infallible;

    async fn resolve_session(&self, _: &str) -> Result<Option<String>, Self::Error> {
      Ok(None)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<IdentityUser>, Self::Error> {
      Ok(self.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn get_user_list(
      &self,
      filter: &UserListFilter,
    ) -> Result<Vec<IdentityUser>, Self::Error> {
      self.list_calls.fetch_add(1, Ordering::SeqCst);
      Ok(
        self
          .users
          .iter()
          .filter(|u| filter.user_ids.contains(&u.id))
          .cloned()
          .collect(),
      )
    }
  }

  fn identity_user(id: &str, username: Option<&str>) -> IdentityUser {
    IdentityUser {
      id:         id.into(),
      username:   username.map(Into::into),
      first_name: Some("First".into()),
      last_name:  Some("Last".into()),
      image_url:  format!("https://img.example/{id}.png"),
    }
  }

  fn post_by(author_id: &str) -> Post {
    Post {
      id:          Uuid::now_v7(),
      author_id:   author_id.into(),
      content:     "hello".into(),
      reply_to_id: None,
      created_at:  Utc::now(),
    }
  }

  #[tokio::test]
  async fn attaches_authors_in_post_order() {
    let dir = Directory::new(vec![
      identity_user("user_a", Some("alice")),
      identity_user("user_b", Some("bob")),
    ]);
    let posts = vec![post_by("user_b"), post_by("user_a"), post_by("user_b")];

    let enriched = add_authors(&dir, posts.clone()).await.unwrap();
    assert_eq!(enriched.len(), 3);
    assert_eq!(enriched[0].author.username, "bob");
    assert_eq!(enriched[1].author.username, "alice");
    assert_eq!(enriched[2].post, posts[2]);
    assert_eq!(dir.list_calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn one_missing_author_fails_the_batch() {
    let dir = Directory::new(vec![identity_user("user_a", Some("alice"))]);
    let posts = vec![post_by("user_a"), post_by("user_ghost")];

    let err = add_authors(&dir, posts).await.unwrap_err();
    assert!(matches!(
      err,
      Error::MissingAuthor { ref author_id, .. } if author_id == "user_ghost"
    ));
  }

  #[tokio::test]
  async fn author_without_username_fails() {
    let dir = Directory::new(vec![identity_user("user_a", None)]);
    let err = add_author(&dir, post_by("user_a")).await.unwrap_err();
    assert!(matches!(err, Error::MissingAuthor { .. }));
  }

  #[tokio::test]
  async fn empty_batch_skips_lookup() {
    let dir = Directory::new(Vec::new());
    let enriched = add_authors(&dir, Vec::new()).await.unwrap();
    assert!(enriched.is_empty());
    assert_eq!(dir.list_calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn single_post_lookup() {
    let dir = Directory::new(vec![identity_user("user_a", Some("alice"))]);
    let enriched = add_author(&dir, post_by("user_a")).await.unwrap();
    assert_eq!(enriched.author.id, "user_a");
    assert_eq!(enriched.author.profile_image_url, "https://img.example/user_a.png");
  }
}
