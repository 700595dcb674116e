//! [`RedisLimiter`]: a sliding window evaluated inside Redis.
//!
//! Time is cut into fixed windows with one counter each. A request is judged
//! against the current counter plus the previous window's counter, weighted by
//! how much of the previous window still overlaps the trailing interval. The
//! read-decide-increment sequence runs as one Lua script, so concurrent
//! servers cannot both take the last slot.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chirp_core::ratelimit::Decision;
use redis::{Client, Script, aio::ConnectionManager};

use crate::Result;

/// KEYS: current counter, previous counter.
/// ARGV: limit, now (ms), window (ms).
/// Returns the remaining quota, or -1 when the request is refused.
const SLIDING_WINDOW_LUA: &str = r#"
local limit  = tonumber(ARGV[1])
local now    = tonumber(ARGV[2])
local window = tonumber(ARGV[3])

local current  = tonumber(redis.call("GET", KEYS[1]) or "0")
local previous = tonumber(redis.call("GET", KEYS[2]) or "0")

local overlap  = 1 - (now % window) / window
local weighted = math.floor(previous * overlap)

if weighted + current >= limit then
  return -1
end

local count = redis.call("INCR", KEYS[1])
if count == 1 then
  redis.call("PEXPIRE", KEYS[1], window * 2 + 1000)
end
return limit - (count + weighted)
"#;

pub struct RedisLimiter {
  conn:         ConnectionManager,
  script:       Script,
  prefix:       String,
  max_requests: u32,
  window:       Duration,
}

impl RedisLimiter {
  /// Connect to `url`. The connection manager reconnects on its own after
  /// transient failures.
  pub async fn connect(
    url: &str,
    prefix: String,
    max_requests: u32,
    window: Duration,
  ) -> Result<Self> {
    let client = Client::open(url)?;
    let conn = client.get_connection_manager().await?;
    Ok(Self {
      conn,
      script: Script::new(SLIDING_WINDOW_LUA),
      prefix,
      max_requests,
      window,
    })
  }

  pub async fn limit(&self, key: &str) -> Result<Decision> {
    let window_ms = window_millis(self.window);
    let now_ms = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
      .unwrap_or_default();
    let (current, previous) = window_keys(&self.prefix, key, now_ms, window_ms);

    let mut conn = self.conn.clone();
    let remaining: i64 = self
      .script
      .key(current)
      .key(previous)
      .arg(self.max_requests)
      .arg(now_ms)
      .arg(window_ms)
      .invoke_async(&mut conn)
      .await?;

    let decision = decision_from(remaining, now_ms, window_ms);
    if !decision.allowed {
      tracing::debug!(key, "rate limit exceeded");
    }
    Ok(decision)
  }
}

fn window_millis(window: Duration) -> u64 {
  u64::try_from(window.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// Counter keys for the window containing `now_ms` and the one before it.
fn window_keys(prefix: &str, key: &str, now_ms: u64, window_ms: u64) -> (String, String) {
  let bucket = now_ms / window_ms;
  (
    format!("{prefix}:{key}:{bucket}"),
    format!("{prefix}:{key}:{}", bucket.saturating_sub(1)),
  )
}

fn decision_from(remaining: i64, now_ms: u64, window_ms: u64) -> Decision {
  let reset = Duration::from_millis(window_ms - now_ms % window_ms);
  match u32::try_from(remaining) {
    Ok(remaining) => Decision { allowed: true, remaining, reset },
    Err(_) => Decision { allowed: false, remaining: 0, reset },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keys_name_adjacent_windows() {
    let (current, previous) = window_keys("chirp:ratelimit", "user_a", 125_000, 60_000);
    assert_eq!(current, "chirp:ratelimit:user_a:2");
    assert_eq!(previous, "chirp:ratelimit:user_a:1");
  }

  #[test]
  fn first_window_has_no_negative_predecessor() {
    let (current, previous) = window_keys("p", "k", 10, 60_000);
    assert_eq!(current, "p:k:0");
    assert_eq!(previous, "p:k:0");
  }

  #[test]
  fn refusal_maps_to_denied_decision() {
    let d = decision_from(-1, 125_000, 60_000);
    assert!(!d.allowed);
    assert_eq!(d.remaining, 0);
    assert_eq!(d.reset, Duration::from_millis(55_000));
  }

  #[test]
  fn remaining_quota_is_passed_through() {
    let d = decision_from(2, 60_000, 60_000);
    assert!(d.allowed);
    assert_eq!(d.remaining, 2);
    assert_eq!(d.reset, Duration::from_millis(60_000));
  }

  #[test]
  fn zero_window_is_clamped() {
    assert_eq!(window_millis(Duration::ZERO), 1);
  }

  /// Runs the script against a live server when `CHIRP_TEST_REDIS_URL` is set.
  #[tokio::test]
  async fn script_admits_limit_then_refuses() {
    let Ok(url) = std::env::var("CHIRP_TEST_REDIS_URL") else {
      return;
    };
    let nonce = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .unwrap()
      .as_nanos();
    let limiter = RedisLimiter::connect(
      &url,
      format!("chirp:test:{nonce}"),
      3,
      Duration::from_secs(3600),
    )
    .await
    .unwrap();

    for remaining in [2, 1, 0] {
      let d = limiter.limit("user_a").await.unwrap();
      assert!(d.allowed);
      assert_eq!(d.remaining, remaining);
    }
    let d = limiter.limit("user_a").await.unwrap();
    assert!(!d.allowed);
    assert!(d.reset <= Duration::from_secs(3600));

    assert!(limiter.limit("user_b").await.unwrap().allowed);
  }
}
