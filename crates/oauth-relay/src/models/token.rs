//! Token data model returned by the provider exchange.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Credential bundle issued by the provider.
///
/// Built once from a [`TokenResponse`] and then stored and served whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Access credential.
    pub access_token: String,

    /// Token type, usually `Bearer`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token_type: String,

    /// Refresh credential, present when offline access was granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Absolute expiry, derived from `expires_in`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    /// Check whether the token has an expiry in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expiry.is_some_and(|at| at <= Utc::now())
    }
}

/// Raw token endpoint response (RFC 6749 §5.1).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,

    #[serde(default)]
    pub token_type: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Lifetime in seconds. Some providers send it as a string.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Convert into a [`Token`], resolving `expires_in` against `received_at`.
    ///
    /// Returns `None` when the response carries no access token.
    #[must_use]
    pub fn into_token(self, received_at: DateTime<Utc>) -> Option<Token> {
        if self.access_token.is_empty() {
            return None;
        }

        let expiry = self
            .expires_in
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| received_at.checked_add_signed(lifetime));

        Some(Token {
            access_token: self.access_token,
            token_type: self.token_type,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            expiry,
        })
    }
}

/// RFC 6749 §5.2 error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenErrorResponse {
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub error_description: Option<String>,
}

#[allow(clippy::cast_possible_truncation)]
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Seconds>::deserialize(deserializer)? {
        None => None,
        Some(Seconds::Int(n)) => Some(n),
        Some(Seconds::Float(f)) => Some(f as i64),
        Some(Seconds::Text(s)) if s.trim().is_empty() => None,
        Some(Seconds::Text(s)) => Some(s.trim().parse().map_err(serde::de::Error::custom)?),
    })
}
