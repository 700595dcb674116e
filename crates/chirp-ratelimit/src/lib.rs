//! Sliding-window rate limiting for Chirp.
//!
//! [`RedisLimiter`] keeps its counters in a shared Redis so every server
//! instance sees the same window. [`MemoryLimiter`] keeps them in-process and
//! is only correct for a single server.

mod hosted;
mod memory;

pub mod error;

use std::time::{Duration, Instant};

use chirp_core::ratelimit::{Decision, RateLimiter};
use serde::Deserialize;

pub use error::{Error, Result};
pub use hosted::RedisLimiter;
pub use memory::MemoryLimiter;

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
  /// `redis://` URL of the shared limiter store. Unset means in-process.
  pub redis_url:    Option<String>,
  #[serde(default = "default_max_requests")]
  pub max_requests: u32,
  #[serde(default = "default_window_secs")]
  pub window_secs:  u64,
  /// Namespace for limiter keys in Redis.
  #[serde(default = "default_prefix")]
  pub prefix:       String,
}

fn default_max_requests() -> u32 { 3 }

fn default_window_secs() -> u64 { 60 }

fn default_prefix() -> String { "chirp:ratelimit".to_string() }

impl Default for RateLimitConfig {
  fn default() -> Self {
    Self {
      redis_url:    None,
      max_requests: default_max_requests(),
      window_secs:  default_window_secs(),
      prefix:       default_prefix(),
    }
  }
}

impl RateLimitConfig {
  pub fn window(&self) -> Duration { Duration::from_secs(self.window_secs) }
}

// ─── Limiter ──────────────────────────────────────────────────────────────────

/// The limiter selected by configuration.
pub enum Limiter {
  Memory(MemoryLimiter),
  Redis(RedisLimiter),
}

impl Limiter {
  pub async fn from_config(config: &RateLimitConfig) -> Result<Self> {
    match &config.redis_url {
      Some(url) => {
        let limiter = RedisLimiter::connect(
          url,
          config.prefix.clone(),
          config.max_requests,
          config.window(),
        )
        .await?;
        tracing::info!(
          max_requests = config.max_requests,
          window_secs = config.window_secs,
          "using redis rate limiter"
        );
        Ok(Self::Redis(limiter))
      }
      None => {
        tracing::warn!(
          "no rate_limit.redis_url configured; limits are per process"
        );
        Ok(Self::Memory(MemoryLimiter::new(
          config.max_requests,
          config.window(),
        )))
      }
    }
  }
}

impl RateLimiter for Limiter {
  type Error = Error;

  async fn limit(&self, key: &str) -> Result<Decision> {
    match self {
      Self::Memory(m) => Ok(m.check(key, Instant::now())),
      Self::Redis(r) => r.limit(key).await,
    }
  }
}
