//! [`MemoryLimiter`]: an exact sliding log held in process memory.

use std::{
  collections::{HashMap, VecDeque},
  convert::Infallible,
  sync::{Mutex, PoisonError},
  time::{Duration, Instant},
};

use chirp_core::ratelimit::{Decision, RateLimiter};

/// Past this many tracked keys, idle keys are swept on the next check.
const SWEEP_THRESHOLD: usize = 10_000;

/// Remembers the instant of every admitted request per key and admits a new
/// one only if fewer than `max_requests` fall inside the trailing window.
pub struct MemoryLimiter {
  max_requests: u32,
  window:       Duration,
  hits:         Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl MemoryLimiter {
  pub fn new(max_requests: u32, window: Duration) -> Self {
    Self {
      max_requests,
      window,
      hits: Mutex::new(HashMap::new()),
    }
  }

  /// Decide for a request arriving at `now`.
  pub fn check(&self, key: &str, now: Instant) -> Decision {
    let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);

    if hits.len() > SWEEP_THRESHOLD {
      hits.retain(|_, log| {
        log
          .back()
          .is_some_and(|&last| now.duration_since(last) < self.window)
      });
    }

    let log = hits.entry(key.to_owned()).or_default();
    while log
      .front()
      .is_some_and(|&first| now.duration_since(first) >= self.window)
    {
      log.pop_front();
    }

    let until_oldest_expires = |log: &VecDeque<Instant>| {
      log
        .front()
        .map_or(self.window, |&first| self.window - now.duration_since(first))
    };

    let admitted = u32::try_from(log.len()).unwrap_or(u32::MAX);
    if admitted >= self.max_requests {
      return Decision {
        allowed:   false,
        remaining: 0,
        reset:     until_oldest_expires(log),
      };
    }

    log.push_back(now);
    Decision {
      allowed:   true,
      remaining: self.max_requests - admitted - 1,
      reset:     until_oldest_expires(log),
    }
  }
}

impl RateLimiter for MemoryLimiter {
  type Error = Infallible;

  async fn limit(&self, key: &str) -> Result<Decision, Infallible> {
    Ok(self.check(key, Instant::now()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const MINUTE: Duration = Duration::from_secs(60);

  #[test]
  fn fourth_request_in_window_is_rejected() {
    let limiter = MemoryLimiter::new(3, MINUTE);
    let t0 = Instant::now();

    for (i, remaining) in [2, 1, 0].into_iter().enumerate() {
      let d = limiter.check("user_a", t0 + Duration::from_secs(i as u64));
      assert!(d.allowed);
      assert_eq!(d.remaining, remaining);
    }

    let d = limiter.check("user_a", t0 + Duration::from_secs(30));
    assert!(!d.allowed);
    assert_eq!(d.remaining, 0);
    assert_eq!(d.reset, Duration::from_secs(30));
  }

  #[test]
  fn window_slides() {
    let limiter = MemoryLimiter::new(3, MINUTE);
    let t0 = Instant::now();
    for i in 0..3 {
      assert!(limiter.check("user_a", t0 + Duration::from_secs(i * 10)).allowed);
    }

    // The first hit (t0) has left the window; the other two have not.
    let later = t0 + Duration::from_secs(61);
    assert!(limiter.check("user_a", later).allowed);
    assert!(!limiter.check("user_a", later).allowed);
  }

  #[test]
  fn rejections_do_not_extend_the_window() {
    let limiter = MemoryLimiter::new(1, MINUTE);
    let t0 = Instant::now();
    assert!(limiter.check("user_a", t0).allowed);
    assert!(!limiter.check("user_a", t0 + Duration::from_secs(59)).allowed);
    assert!(limiter.check("user_a", t0 + MINUTE).allowed);
  }

  #[test]
  fn keys_are_independent() {
    let limiter = MemoryLimiter::new(1, MINUTE);
    let t0 = Instant::now();
    assert!(limiter.check("user_a", t0).allowed);
    assert!(limiter.check("user_b", t0).allowed);
    assert!(!limiter.check("user_a", t0).allowed);
  }

  #[test]
  fn zero_quota_rejects_everything() {
    let limiter = MemoryLimiter::new(0, MINUTE);
    assert!(!limiter.check("user_a", Instant::now()).allowed);
  }
}
