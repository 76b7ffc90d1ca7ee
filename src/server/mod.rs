//! Token service
//!
//! Exposes the token builder over HTTP with a health probe.

mod http;
pub mod messages;

pub use http::{create_router, ApiError, AppState, TokenServer};
pub use messages::{ErrorResponse, HealthResponse, TokenRequest, TokenResponse};
