//! HTTP endpoints for the relay.
//!
//! - `GET /start?identifier=..` redirects to the provider
//! - `GET /callback?code=..&state=..` exchanges the code and stores the token
//! - `GET /fetch_token?identifier=..` returns the stored token as JSON

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::{RelayError, RelayResult};
use crate::oauth::{AuthorizationProvider, handshake};
use crate::store::TokenStore;

/// Body returned after a completed callback.
pub const AUTHORIZATION_SUCCESS: &str = "Authorization successful. You can close this window.";

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn AuthorizationProvider>,
    pub store: Arc<dyn TokenStore>,
}

impl AppState {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthorizationProvider>, store: Arc<dyn TokenStore>) -> Self {
        Self { provider, store }
    }
}

/// Decoded query pairs in request order.
///
/// Repeated keys are kept so lookups can take the first occurrence instead
/// of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// First value for `key`, if present.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// Create the HTTP router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/start", get(handle_start))
        .route("/callback", get(handle_callback))
        .route("/fetch_token", get(handle_fetch_token))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(log_request)),
        )
        .with_state(Arc::new(state))
}

async fn log_request(request: Request, next: Next) -> Response {
    tracing::info!(method = %request.method(), uri = %request.uri(), "Received request");
    next.run(request).await
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "oauth-relay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tokens = state.store.len().await;
    Json(serde_json::json!({
        "status": "ready",
        "service": "oauth-relay",
        "version": env!("CARGO_PKG_VERSION"),
        "tokens": tokens
    }))
}

/// `GET /start`
///
/// Redirect the user agent to the provider, carrying the identifier as `state`.
async fn handle_start(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryParams>,
) -> RelayResult<Response> {
    let url = handshake::start(state.provider.as_ref(), query.first("identifier"))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response())
}

/// `GET /callback`
///
/// Landing point for the provider redirect.
async fn handle_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryParams>,
) -> RelayResult<&'static str> {
    handshake::callback(
        state.provider.as_ref(),
        state.store.as_ref(),
        query.first("code"),
        query.first("state"),
    )
    .await?;

    Ok(AUTHORIZATION_SUCCESS)
}

/// `GET /fetch_token`
async fn handle_fetch_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryParams>,
) -> RelayResult<Response> {
    let token = handshake::fetch(state.store.as_ref(), query.first("identifier")).await?;
    let body = serde_json::to_vec(&token).map_err(RelayError::SerializationFailed)?;

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response())
}
