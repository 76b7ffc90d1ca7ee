//! rtctoken - signed access tokens for real-time channels
//!
//! Issues short-lived, self-contained credentials that let a client join a
//! channel as a publisher or subscriber. A verifier holding the same shared
//! secret can check them without any server-side state.

pub mod auth;
pub mod channels;
pub mod config;
pub mod server;

pub use auth::{build_token, PrivilegeKind, Role, SignedToken, TokenBuilder, TokenError, TokenVerifier};
pub use channels::{Channel, UserId};
pub use config::{IssuerConfig, ServerConfig};
pub use server::TokenServer;
