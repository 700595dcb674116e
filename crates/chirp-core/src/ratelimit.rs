//! The `RateLimiter` trait, implemented by `chirp-ratelimit`.

use std::{future::Future, time::Duration};

/// The outcome of one [`RateLimiter::limit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
  pub allowed:   bool,
  /// Requests still available in the current window after this one.
  pub remaining: u32,
  /// How long until the window admits another request.
  pub reset:     Duration,
}

/// A sliding-window limiter keyed by an arbitrary string (a user id).
pub trait RateLimiter: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Record one request for `key` and decide whether it may proceed.
  /// Rejected requests do not count against the window.
  fn limit<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Decision, Self::Error>> + Send + 'a;
}
