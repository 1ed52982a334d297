//! OAuth2 client adapter for the configured provider.
//!
//! Builds authorization URLs and exchanges authorization codes for tokens.
//! The configuration is immutable once built and shared without locking.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::config::{AuthStyle, Config};
use crate::error::{ExchangeError, ExchangeResult};
use crate::models::{Token, TokenErrorResponse, TokenResponse};

/// The two provider operations the handshake needs.
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    /// Authorization URL carrying `state` as the correlation value.
    fn authorize_url(&self, state: &str) -> Url;

    /// Exchange an authorization code for a token.
    async fn exchange_code(&self, code: &str) -> ExchangeResult<Token>;
}

/// Provider endpoints and client credentials.
#[derive(Clone)]
pub struct OAuth2Client {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_url: Url,
    scopes: Vec<String>,
    auth_url: Url,
    token_url: Url,
    auth_style: AuthStyle,
}

impl OAuth2Client {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
            scopes: config.scopes.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            auth_style: config.auth_style,
        })
    }

    fn token_request(&self, code: &str) -> reqwest::RequestBuilder {
        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_url.as_str()),
        ];

        let request = self.http.post(self.token_url.clone()).header(ACCEPT, "application/json");

        match self.auth_style {
            AuthStyle::InParams => {
                form.push(("client_id", self.client_id.as_str()));
                form.push(("client_secret", self.client_secret.as_str()));
                request.form(&form)
            }
            AuthStyle::InHeader => request
                .basic_auth(form_encode(&self.client_id), Some(form_encode(&self.client_secret)))
                .form(&form),
        }
    }
}

#[async_trait]
impl AuthorizationProvider for OAuth2Client {
    fn authorize_url(&self, state: &str) -> Url {
        let mut url = self.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("access_type", "offline")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", self.redirect_url.as_str())
                .append_pair("response_type", "code");
            if !self.scopes.is_empty() {
                query.append_pair("scope", &self.scopes.join(" "));
            }
            query.append_pair("state", state);
        }
        url
    }

    async fn exchange_code(&self, code: &str) -> ExchangeResult<Token> {
        tracing::debug!(token_url = %self.token_url, "Exchanging authorization code");

        let response = self.token_request(code).send().await?;
        let received_at = Utc::now();
        let status = response.status();
        let form_encoded = is_form_encoded(&response);
        let body = response.text().await?;

        if !status.is_success() {
            let details = parse_error_body(&body, form_encoded);
            return Err(ExchangeError::provider(
                status.as_u16(),
                details.error,
                details.error_description.or_else(|| non_empty(&body)),
            ));
        }

        let parsed: TokenResponse = if form_encoded {
            serde_urlencoded::from_str(&body).map_err(ExchangeError::parse)?
        } else {
            serde_json::from_str(&body).map_err(ExchangeError::parse)?
        };

        let token = parsed.into_token(received_at).ok_or(ExchangeError::MissingAccessToken)?;

        tracing::info!(
            token_type = %token.token_type,
            has_refresh_token = token.refresh_token.is_some(),
            "Exchanged authorization code"
        );
        Ok(token)
    }
}

impl std::fmt::Debug for OAuth2Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2Client")
            .field("client_id", &self.client_id)
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("auth_style", &self.auth_style)
            .finish_non_exhaustive()
    }
}

/// GitHub-style providers answer with a form body instead of JSON.
fn is_form_encoded(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            let mime = v.split(';').next().unwrap_or_default().trim();
            mime.eq_ignore_ascii_case("application/x-www-form-urlencoded")
                || mime.eq_ignore_ascii_case("text/plain")
        })
        .unwrap_or(false)
}

fn parse_error_body(body: &str, form_encoded: bool) -> TokenErrorResponse {
    let parsed = if form_encoded {
        serde_urlencoded::from_str(body).ok()
    } else {
        serde_json::from_str(body).ok()
    };
    parsed.unwrap_or_default()
}

fn non_empty(body: &str) -> Option<String> {
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// RFC 6749 §2.3.1: credentials are form-encoded before Basic auth.
fn form_encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: &Config) -> OAuth2Client {
        OAuth2Client::new(config).unwrap()
    }

    #[test]
    fn test_authorize_url_carries_state() {
        let config = Config::for_testing("https://provider.example.com");
        let url = client(&config).authorize_url("u1");

        assert!(url.as_str().starts_with("https://provider.example.com/auth?"));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| pairs.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("state"), Some("u1"));
        assert_eq!(get("client_id"), Some("test-client"));
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("redirect_uri"), Some("http://localhost:8080/callback"));
        assert_eq!(get("scope"), Some("openid email"));
    }

    #[test]
    fn test_authorize_url_encodes_state() {
        let config = Config::for_testing("https://provider.example.com");
        let url = client(&config).authorize_url("user@example.com&x=1");

        assert!(url.as_str().contains("state=user%40example.com%26x%3D1"));
        let state = url.query_pairs().find(|(k, _)| k == "state").map(|(_, v)| v.into_owned());
        assert_eq!(state.as_deref(), Some("user@example.com&x=1"));
    }

    #[test]
    fn test_authorize_url_keeps_existing_query() {
        let mut config = Config::for_testing("https://provider.example.com");
        config.auth_url = Url::parse("https://provider.example.com/auth?prompt=consent").unwrap();
        let url = client(&config).authorize_url("u1");

        assert!(url.as_str().starts_with("https://provider.example.com/auth?prompt=consent&"));
        assert!(url.query_pairs().any(|(k, v)| k == "state" && v == "u1"));
    }

    #[test]
    fn test_authorize_url_omits_empty_scope() {
        let mut config = Config::for_testing("https://provider.example.com");
        config.scopes.clear();
        let url = client(&config).authorize_url("u1");

        assert!(!url.query_pairs().any(|(k, _)| k == "scope"));
    }

    #[test]
    fn test_debug_hides_client_secret() {
        let config = Config::for_testing("https://provider.example.com");
        let debug = format!("{:?}", client(&config));
        assert!(!debug.contains("test-secret"));
    }
}
