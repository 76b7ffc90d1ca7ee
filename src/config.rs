//! Issuer and server configuration

use crate::auth::TokenError;
use std::fmt;
use std::net::SocketAddr;

/// Environment variable holding the issuer identity
pub const ISSUER_ID_ENV: &str = "RTCTOKEN_ISSUER_ID";

/// Environment variable holding the issuer secret
pub const ISSUER_SECRET_ENV: &str = "RTCTOKEN_ISSUER_SECRET";

/// Default token lifetime in seconds
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Longest lifetime the HTTP service will issue
pub const MAX_TTL_SECS: u64 = 86_400;

/// Identity and shared secret of the token issuer
#[derive(Clone, PartialEq, Eq)]
pub struct IssuerConfig {
    issuer_id: String,
    secret: Vec<u8>,
}

impl IssuerConfig {
    /// Both the identity and the secret must be non-empty
    pub fn new(issuer_id: impl Into<String>, secret: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let issuer_id = issuer_id.into();
        let secret = secret.into();

        if issuer_id.is_empty() {
            return Err(TokenError::Configuration("issuer id"));
        }
        if secret.is_empty() {
            return Err(TokenError::Configuration("issuer secret"));
        }

        Ok(Self { issuer_id, secret })
    }

    /// Load from `RTCTOKEN_ISSUER_ID` and `RTCTOKEN_ISSUER_SECRET`
    pub fn from_env() -> Result<Self, TokenError> {
        let issuer_id = std::env::var(ISSUER_ID_ENV).unwrap_or_default();
        let secret = std::env::var(ISSUER_SECRET_ENV).unwrap_or_default();
        Self::new(issuer_id, secret)
    }

    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    /// Get the secret (for signing only)
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for IssuerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuerConfig")
            .field("issuer_id", &self.issuer_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Settings for the HTTP token service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub issuer: IssuerConfig,
    /// Lifetime used when a request does not ask for one
    pub default_ttl: u64,
    /// Requested lifetimes are capped at this value
    pub max_ttl: u64,
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr, issuer: IssuerConfig) -> Self {
        Self {
            bind_addr,
            issuer,
            default_ttl: DEFAULT_TTL_SECS,
            max_ttl: MAX_TTL_SECS,
        }
    }

    pub fn default_ttl(mut self, ttl: u64) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn max_ttl(mut self, ttl: u64) -> Self {
        self.max_ttl = ttl;
        self
    }

    /// Resolve a requested lifetime against the defaults and cap
    pub fn ttl_for(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.default_ttl).min(self.max_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issuer_config_requires_id_and_secret() {
        assert!(IssuerConfig::new("app123", "cert456").is_ok());
        assert!(matches!(
            IssuerConfig::new("", "cert456"),
            Err(TokenError::Configuration("issuer id"))
        ));
        assert!(matches!(
            IssuerConfig::new("app123", ""),
            Err(TokenError::Configuration("issuer secret"))
        ));
    }

    #[test]
    fn test_issuer_config_from_env() {
        std::env::remove_var(ISSUER_ID_ENV);
        std::env::remove_var(ISSUER_SECRET_ENV);
        assert!(matches!(
            IssuerConfig::from_env(),
            Err(TokenError::Configuration("issuer id"))
        ));

        std::env::set_var(ISSUER_ID_ENV, "app123");
        assert!(matches!(
            IssuerConfig::from_env(),
            Err(TokenError::Configuration("issuer secret"))
        ));

        std::env::set_var(ISSUER_SECRET_ENV, "cert456");
        let config = IssuerConfig::from_env().unwrap();
        assert_eq!(config.issuer_id(), "app123");
        assert_eq!(config.secret(), b"cert456");

        std::env::remove_var(ISSUER_ID_ENV);
        std::env::remove_var(ISSUER_SECRET_ENV);
    }

    #[test]
    fn test_issuer_config_debug_redacts_secret() {
        let config = IssuerConfig::new("app123", "cert456").unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("app123"));
        assert!(!debug.contains("cert456"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_ttl_for() {
        let issuer = IssuerConfig::new("app123", "cert456").unwrap();
        let config = ServerConfig::new("127.0.0.1:0".parse().unwrap(), issuer)
            .default_ttl(600)
            .max_ttl(1_000);

        assert_eq!(config.ttl_for(None), 600);
        assert_eq!(config.ttl_for(Some(30)), 30);
        assert_eq!(config.ttl_for(Some(5_000)), 1_000);
    }
}
