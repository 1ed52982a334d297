//! Start / callback / fetch steps of the authorization-code relay.
//!
//! There is no state-machine object: which step a request is in follows
//! from the endpoint hit, and the only persisted state is the token store.

use url::Url;

use super::client::AuthorizationProvider;
use crate::error::{RelayError, RelayResult};
use crate::models::Token;
use crate::store::TokenStore;

/// Result of a successful callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Token stored under this identifier.
    Stored(String),
    /// Exchange succeeded but no `state` came back, so nothing was stored.
    Discarded,
}

/// Build the provider redirect for `identifier`.
pub fn start(provider: &dyn AuthorizationProvider, identifier: Option<&str>) -> RelayResult<Url> {
    let identifier = present(identifier).ok_or(RelayError::MissingIdentifier)?;
    Ok(provider.authorize_url(identifier))
}

/// Exchange `code` and record the token under `state`.
///
/// Exchange failures are not retried and leave the store untouched.
pub async fn callback(
    provider: &dyn AuthorizationProvider,
    store: &dyn TokenStore,
    code: Option<&str>,
    state: Option<&str>,
) -> RelayResult<CallbackOutcome> {
    let code = present(code).ok_or(RelayError::MissingCode)?;

    let token = provider.exchange_code(code).await?;

    match present(state) {
        Some(identifier) => {
            store.put(identifier, token).await;
            tracing::info!(identifier, "Token stored");
            Ok(CallbackOutcome::Stored(identifier.to_owned()))
        }
        None => {
            tracing::warn!("Callback without state; exchanged token was not stored");
            Ok(CallbackOutcome::Discarded)
        }
    }
}

/// Look up the token stored for `identifier`.
pub async fn fetch(store: &dyn TokenStore, identifier: Option<&str>) -> RelayResult<Token> {
    let identifier = present(identifier).ok_or(RelayError::MissingIdentifier)?;
    store.get(identifier).await.ok_or(RelayError::NotFound)
}

// Absent and empty query values are the same thing to callers.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
