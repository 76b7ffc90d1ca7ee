//! JSON bodies of the token service

use crate::auth::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /token`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default)]
    pub channel_name: Option<String>,
    /// String or integer
    #[serde(default)]
    pub uid: Option<Value>,
    /// Only `"publisher"` publishes; any other value subscribes
    #[serde(default)]
    pub role: Option<Value>,
    /// Admins always publish
    #[serde(default)]
    pub is_admin: bool,
    /// Requested lifetime, capped by the server
    #[serde(default)]
    pub expire_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub channel_name: String,
    pub uid: String,
    pub role: Role,
    pub expires_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub issuer_configured: bool,
}

/// Error body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
