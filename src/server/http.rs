//! HTTP token service
//!
//! - `POST /token` issues a token for a channel and user
//! - `GET /health` reports liveness and issuer configuration

use crate::auth::{Role, TokenBuilder, TokenError};
use crate::channels::UserId;
use crate::config::ServerConfig;
use crate::server::messages::{ErrorResponse, HealthResponse, TokenRequest, TokenResponse};

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub builder: Arc<TokenBuilder>,
    pub config: Arc<ServerConfig>,
}

/// Error returned from handlers
#[derive(Debug)]
pub struct ApiError(TokenError);

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self(TokenError::InvalidRequest {
            field,
            reason: reason.into(),
        })
    }

    fn status(&self) -> StatusCode {
        match &self.0 {
            TokenError::InvalidRequest { .. } | TokenError::ExpiredRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            TokenError::InvalidFormat
            | TokenError::UnsupportedVersion(_)
            | TokenError::IssuerMismatch
            | TokenError::InvalidSignature
            | TokenError::Decode(_)
            | TokenError::ChannelMismatch
            | TokenError::PrivilegeDenied(_)
            | TokenError::Expired(_) => StatusCode::UNAUTHORIZED,
            TokenError::Configuration(_) | TokenError::Signature => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal failures get a generic message
        let message = if status.is_server_error() {
            error!(kind = self.0.kind(), "Token generation failed");
            "failed to generate token".to_string()
        } else {
            warn!(kind = self.0.kind(), error = %self.0, "Rejected token request");
            self.0.to_string()
        };

        let body = ErrorResponse {
            error: self.0.kind().to_string(),
            message,
            field: match &self.0 {
                // Clients choose a lifetime, not an absolute expiry
                TokenError::ExpiredRequest { .. } => Some("expireSeconds".to_string()),
                err => err.field().map(str::to_string),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Create the HTTP router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/token", post(token_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        // The daemon refuses to start without an issuer
        issuer_configured: true,
    })
}

async fn token_handler(
    State(state): State<AppState>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::invalid("body", e.body_text()))?;

    let channel_name = req
        .channel_name
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::invalid("channelName", "missing"))?;
    let uid = match req.uid {
        None | Some(Value::Null) => return Err(ApiError::invalid("uid", "missing")),
        Some(value) => UserId::from_json(&value)
            .ok_or_else(|| ApiError::invalid("uid", "must be a string or integer"))?,
    };

    let role = Role::from_request(req.role.as_ref().and_then(Value::as_str), req.is_admin);

    let ttl = state.config.ttl_for(req.expire_seconds);
    let expires_at = state.builder.now().saturating_add(ttl);

    let token = state
        .builder
        .build_token(&channel_name, &uid, role, expires_at)?;

    info!(channel = %channel_name, role = %role, expires_at, "Token generated");

    Ok(Json(TokenResponse {
        token: token.into_string(),
        channel_name,
        uid: uid.to_string(),
        role,
        expires_at,
    }))
}

/// The token service
pub struct TokenServer {
    config: Arc<ServerConfig>,
    builder: Arc<TokenBuilder>,
}

impl TokenServer {
    pub fn new(config: ServerConfig) -> Self {
        let builder = TokenBuilder::new(config.issuer.clone());
        Self::with_builder(config, builder)
    }

    /// Use a custom builder (e.g. with fixed entropy and clock)
    pub fn with_builder(config: ServerConfig, builder: TokenBuilder) -> Self {
        Self {
            config: Arc::new(config),
            builder: Arc::new(builder),
        }
    }

    pub fn router(&self) -> Router {
        create_router(AppState {
            builder: self.builder.clone(),
            config: self.config.clone(),
        })
    }

    /// Run the server until `shutdown` completes
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        info!(
            addr = %listener.local_addr()?,
            issuer = self.builder.issuer().issuer_id(),
            "Token server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
