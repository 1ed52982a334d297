//! OAuth2 Authorization-Code Relay
//!
//! Sends a user agent to the provider's consent page keyed by a caller-supplied
//! identifier, exchanges the returned authorization code for a token, keeps the
//! token in memory under that identifier, and hands it back on request.
//!
//! # Flow
//!
//! 1. `GET /start?identifier=u1` redirects to the provider with `state=u1`
//! 2. The provider redirects to `GET /callback?code=..&state=u1`; the code is
//!    exchanged and the token stored under `u1`
//! 3. `GET /fetch_token?identifier=u1` returns the token as JSON
//!
//! # Example
//!
//! ```no_run
//! use oauth_relay::{config::Config, server::RelayServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     RelayServer::new(&config)?.run().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod oauth;
pub mod server;
pub mod store;

pub use config::Config;
pub use error::{ExchangeError, RelayError};
pub use models::Token;
pub use store::{MemoryTokenStore, TokenStore};
