//! Typed async client for the Chirp RPC API.
//!
//! One method per procedure; inputs and outputs are the shared types from
//! [`chirp_core::rpc`], so the client and server cannot drift apart on field
//! names.

mod client;

pub mod error;

pub use client::{ApiClient, ApiConfig};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
