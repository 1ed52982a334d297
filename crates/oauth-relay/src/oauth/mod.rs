//! OAuth2 authorization-code flow against a single upstream provider.
//!
//! - [`client`]: provider adapter (authorization URL, code exchange)
//! - [`handshake`]: start / callback / fetch steps over the adapter and the token store

pub mod client;
pub mod handshake;

pub use client::{AuthorizationProvider, OAuth2Client};
pub use handshake::CallbackOutcome;
