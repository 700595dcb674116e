//! Core types and trait definitions for Chirp.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store, identity provider, and rate limiter are described here as traits and
//! implemented by the backend crates.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod enrich;
pub mod error;
pub mod identity;
pub mod page;
pub mod post;
pub mod ratelimit;
pub mod rpc;
pub mod store;
pub mod user;

pub use error::{Error, Result};
