//! Cursor pagination over post ids.
//!
//! A page is fetched by asking the store for `limit + 1` rows starting at the
//! cursor (inclusive), newest first. The extra row, if present, is not
//! returned; its id becomes the cursor of the next page.

use uuid::Uuid;

pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 100;

/// Parameters for [`crate::store::SocialStore::list_posts`].
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
  /// Maximum number of rows to return.
  pub take:        usize,
  /// Only rows whose id is at or below this one.
  pub cursor:      Option<Uuid>,
  pub author_id:   Option<String>,
  pub reply_to_id: Option<Uuid>,
}

impl PostQuery {
  /// A query that over-fetches by one row so [`Page::from_rows`] can tell
  /// whether another page exists.
  pub fn page(limit: usize) -> Self {
    Self {
      take: limit + 1,
      ..Self::default()
    }
  }
}

/// Normalise a caller-supplied limit. Absent or zero means the default;
/// anything above [`MAX_LIMIT`] is refused.
pub fn resolve_limit(limit: Option<usize>) -> Option<usize> {
  match limit {
    None | Some(0) => Some(DEFAULT_LIMIT),
    Some(n) if n <= MAX_LIMIT => Some(n),
    Some(_) => None,
  }
}

/// One page of results plus the cursor for the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
  pub items:       Vec<T>,
  pub next_cursor: Option<Uuid>,
}

impl<T> Page<T> {
  /// Split an over-fetched row set into a page of at most `limit` items.
  pub fn from_rows(mut rows: Vec<T>, limit: usize, key: impl Fn(&T) -> Uuid) -> Self {
    let next_cursor = if rows.len() > limit {
      rows.truncate(limit + 1);
      rows.pop().map(|row| key(&row))
    } else {
      None
    };
    Self { items: rows, next_cursor }
  }
}
