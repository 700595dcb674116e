//! Identity-provider adapters for Chirp.
//!
//! [`ClerkIdentity`] talks to a hosted provider over its backend HTTP API.
//! [`StaticIdentity`] is a fixed in-memory directory for tests and local
//! development.

mod clerk;
mod directory;

pub mod error;

pub use clerk::{ClerkIdentity, IdentityConfig};
pub use directory::StaticIdentity;
pub use error::{Error, Result};
