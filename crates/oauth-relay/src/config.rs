//! Configuration for the OAuth relay.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use url::Url;

/// Provider and server defaults.
pub mod defaults {
    /// Google authorization endpoint.
    pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

    /// Google token endpoint.
    pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

    /// Listening port when `HTTP_PORT` is unset.
    pub const HTTP_PORT: u16 = 8080;
}

/// How client credentials are presented to the token endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStyle {
    /// `client_id` and `client_secret` in the form body.
    #[default]
    InParams,
    /// HTTP Basic authentication header.
    InHeader,
}

impl FromStr for AuthStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "params" | "in_params" | "body" => Ok(Self::InParams),
            "header" | "in_header" | "basic" => Ok(Self::InHeader),
            other => bail!("unknown auth style '{other}' (expected 'params' or 'header')"),
        }
    }
}

/// Relay configuration.
#[derive(Clone)]
pub struct Config {
    /// OAuth client ID issued by the provider.
    pub client_id: String,

    /// OAuth client secret issued by the provider.
    pub client_secret: String,

    /// Callback URL registered with the provider (points at `/callback`).
    pub redirect_url: Url,

    /// Requested scopes.
    pub scopes: Vec<String>,

    /// Provider authorization endpoint.
    pub auth_url: Url,

    /// Provider token endpoint.
    pub token_url: Url,

    /// Client authentication style at the token endpoint.
    pub auth_style: AuthStyle,

    /// Timeout for the token exchange. `None` keeps the transport default.
    pub http_timeout: Option<Duration>,

    /// Port the HTTP server listens on.
    pub port: u16,
}

impl Config {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns error if a required key is missing or a value is malformed.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required =
            |key: &str| optional(key).with_context(|| format!("{key} is required"));

        let client_id = required("OAUTH_CLIENT_ID")?;
        let client_secret = required("OAUTH_CLIENT_SECRET")?;
        let redirect_url = parse_url("OAUTH_REDIRECT_URL", &required("OAUTH_REDIRECT_URL")?)?;

        let scopes = optional("OAUTH_SCOPE").map(|s| parse_scopes(&s)).unwrap_or_default();

        let auth_url = parse_url(
            "OAUTH_AUTH_URL",
            &optional("OAUTH_AUTH_URL").unwrap_or_else(|| defaults::AUTH_URL.to_string()),
        )?;
        let token_url = parse_url(
            "OAUTH_TOKEN_URL",
            &optional("OAUTH_TOKEN_URL").unwrap_or_else(|| defaults::TOKEN_URL.to_string()),
        )?;

        let auth_style = optional("OAUTH_AUTH_STYLE")
            .map(|s| s.parse::<AuthStyle>())
            .transpose()
            .context("Invalid OAUTH_AUTH_STYLE")?
            .unwrap_or_default();

        let http_timeout = optional("OAUTH_HTTP_TIMEOUT_SECS")
            .map(|s| s.trim().parse::<u64>())
            .transpose()
            .context("Invalid OAUTH_HTTP_TIMEOUT_SECS")?
            .map(Duration::from_secs);

        let port = optional("HTTP_PORT")
            .map(|s| s.trim().parse::<u16>())
            .transpose()
            .context("Invalid HTTP_PORT")?
            .unwrap_or(defaults::HTTP_PORT);

        Ok(Self {
            client_id,
            client_secret,
            redirect_url,
            scopes,
            auth_url,
            token_url,
            auth_style,
            http_timeout,
            port,
        })
    }

    /// Create a test configuration pointing both provider endpoints at a mock server.
    ///
    /// # Panics
    ///
    /// Panics if `base_url` is not a valid URL.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_url: Url::parse("http://localhost:8080/callback").expect("valid redirect url"),
            scopes: vec!["openid".to_string(), "email".to_string()],
            auth_url: Url::parse(&format!("{base}/auth")).expect("valid auth url"),
            token_url: Url::parse(&format!("{base}/token")).expect("valid token url"),
            auth_style: AuthStyle::InParams,
            http_timeout: Some(Duration::from_secs(5)),
            port: 0,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url.as_str())
            .field("scopes", &self.scopes)
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("auth_style", &self.auth_style)
            .field("http_timeout", &self.http_timeout)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// Split a scope string on whitespace. Commas are part of the scope value.
#[must_use]
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

fn parse_url(key: &str, raw: &str) -> anyhow::Result<Url> {
    Url::parse(raw.trim()).with_context(|| format!("{key} is not a valid URL: {raw}"))
}
