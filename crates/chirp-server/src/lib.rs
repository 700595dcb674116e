//! HTTP server assembly for Chirp.
//!
//! Mounts the RPC router under `/rpc`, adds `/health`, and wraps everything
//! in request tracing. The binary in `main.rs` wires the concrete store,
//! identity client, and limiter from [`ServerConfig`].

use std::path::{Path, PathBuf};

use axum::{Router, routing::get};
use chirp_api::AppState;
use chirp_core::{
  identity::IdentityProvider, ratelimit::RateLimiter, store::SocialStore,
};
use chirp_identity::IdentityConfig;
use chirp_ratelimit::RateLimitConfig;
use config::{Config, ConfigError, Environment, Source};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `CHIRP_*` environment overrides (`__` separates nested keys).
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
  pub identity:   IdentityConfig,
  #[serde(default)]
  pub rate_limit: RateLimitConfig,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

impl ServerConfig {
  /// Read `path` if it exists, then layer the environment on top.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_source(config::File::from(path).required(false))
  }

  fn from_source<T>(file: T) -> Result<Self, ConfigError>
  where
    T: Source + Send + Sync + 'static,
  {
    Config::builder()
      .add_source(file)
      .add_source(
        Environment::with_prefix("CHIRP")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level router.
pub fn router<S, I, L>(state: AppState<S, I, L>) -> Router
where
  S: SocialStore,
  I: IdentityProvider,
  L: RateLimiter,
{
  Router::new()
    .route("/health", get(health))
    .nest("/rpc", chirp_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use chirp_identity::StaticIdentity;
  use chirp_ratelimit::MemoryLimiter;
  use chirp_store_sqlite::SqliteStore;
  use config::FileFormat;
  use tower::ServiceExt as _;

  use super::*;

  async fn app() -> Router {
    let state = AppState::new(
      SqliteStore::open_in_memory().await.unwrap(),
      StaticIdentity::new(),
      MemoryLimiter::new(3, Duration::from_secs(60)),
    );
    router(state)
  }

  async fn get_body(uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app().await.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
  }

  #[tokio::test]
  async fn health_is_ok() {
    assert_eq!(get_body("/health").await, (StatusCode::OK, "ok".to_string()));
  }

  #[tokio::test]
  async fn rpc_is_mounted() {
    let (status, body) = get_body("/rpc/posts.list").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"posts\":[]"), "body: {body}");
  }

  #[tokio::test]
  async fn unknown_procedure_is_404() {
    let (status, _) = get_body("/rpc/posts.delete").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[test]
  fn config_defaults_fill_gaps() {
    let toml = r#"
      store_path = "~/.local/share/chirp/chirp.db"

      [identity]
      secret_key = "sk_test_123"
    "#;
    let cfg = ServerConfig::from_source(config::File::from_str(toml, FileFormat::Toml))
      .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:3000");
    assert_eq!(cfg.identity.api_url, "https://api.clerk.com");
    assert_eq!(cfg.identity.timeout_secs, 10);
    assert_eq!(cfg.rate_limit.max_requests, 3);
    assert_eq!(cfg.rate_limit.window_secs, 60);
    assert!(cfg.rate_limit.redis_url.is_none());
  }

  #[test]
  fn config_reads_nested_tables() {
    let toml = r#"
      host = "0.0.0.0"
      port = 8080
      store_path = "/var/lib/chirp/chirp.db"

      [identity]
      api_url = "http://localhost:9999"
      secret_key = "sk_live_abc"

      [rate_limit]
      redis_url = "redis://127.0.0.1:6379"
      max_requests = 10
    "#;
    let cfg = ServerConfig::from_source(config::File::from_str(toml, FileFormat::Toml))
      .unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert_eq!(cfg.identity.api_url, "http://localhost:9999");
    assert_eq!(cfg.rate_limit.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
    assert_eq!(cfg.rate_limit.max_requests, 10);
    assert_eq!(cfg.rate_limit.prefix, "chirp:ratelimit");
  }

  #[test]
  fn missing_secret_key_is_an_error() {
    let toml = r#"store_path = "chirp.db""#;
    assert!(
      ServerConfig::from_source(config::File::from_str(toml, FileFormat::Toml)).is_err()
    );
  }

  #[test]
  fn tilde_expansion_leaves_absolute_paths_alone() {
    let p = Path::new("/var/lib/chirp.db");
    assert_eq!(expand_tilde(p), PathBuf::from("/var/lib/chirp.db"));
  }
}
