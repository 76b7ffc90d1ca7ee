//! Token construction and verification
//!
//! Token layout: `006` + issuer id + base64url(payload) + hex(HMAC-SHA256)
//!
//! The signature covers the base64 payload text and is always the last
//! 64 characters. The issuer id has no delimiter; verifiers locate it by
//! knowing their own issuer id.

use crate::auth::payload::TokenPayload;
use crate::auth::privileges::{PrivilegeKind, PrivilegeSet, Role};
use crate::auth::signer::{self, DIGEST_HEX_LEN, DIGEST_LEN};
use crate::auth::source::{Clock, OsSalt, SaltSource, SystemClock};
use crate::channels::{Channel, ChannelError, UserId};
use crate::config::IssuerConfig;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Wire format version tag
pub const TOKEN_VERSION: &str = "006";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("issuer not configured: missing {0}")]
    Configuration(&'static str),

    #[error("invalid {field}: {reason}")]
    InvalidRequest { field: &'static str, reason: String },

    #[error("expiry {expires_at} is not after current time {now}")]
    ExpiredRequest { expires_at: u64, now: u64 },

    #[error("signature computation failed")]
    Signature,

    #[error("invalid token format")]
    InvalidFormat,

    #[error("unsupported token version '{0}'")]
    UnsupportedVersion(String),

    #[error("token was not issued by this issuer")]
    IssuerMismatch,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token decode error: {0}")]
    Decode(String),

    #[error("token is not valid for this channel or user")]
    ChannelMismatch,

    #[error("token does not grant {0}")]
    PrivilegeDenied(PrivilegeKind),

    #[error("{0} privilege has expired")]
    Expired(PrivilegeKind),
}

impl TokenError {
    /// Stable name of the error kind, safe to show to clients
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Configuration(_) => "ConfigurationError",
            TokenError::InvalidRequest { .. } => "InvalidRequestError",
            TokenError::ExpiredRequest { .. } => "ExpiredRequestError",
            TokenError::Signature => "SignatureError",
            TokenError::InvalidFormat
            | TokenError::UnsupportedVersion(_)
            | TokenError::IssuerMismatch
            | TokenError::InvalidSignature
            | TokenError::Decode(_) => "InvalidTokenError",
            TokenError::ChannelMismatch
            | TokenError::PrivilegeDenied(_)
            | TokenError::Expired(_) => "UnauthorizedError",
        }
    }

    /// Request field at fault, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            TokenError::InvalidRequest { field, .. } => Some(*field),
            _ => None,
        }
    }

    fn channel(err: ChannelError) -> Self {
        TokenError::InvalidRequest {
            field: "channelName",
            reason: err.to_string(),
        }
    }

    fn user(err: ChannelError) -> Self {
        TokenError::InvalidRequest {
            field: "uid",
            reason: err.to_string(),
        }
    }
}

/// A signed, self-contained access token
#[derive(Debug, Clone)]
pub struct SignedToken {
    /// The full token string
    token: String,
    payload_b64: String,
    signature: String,
    /// Decoded payload
    payload: TokenPayload,
}

impl SignedToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn into_string(self) -> String {
        self.token
    }

    pub fn version(&self) -> &str {
        TOKEN_VERSION
    }

    pub fn payload_b64(&self) -> &str {
        &self.payload_b64
    }

    /// Lowercase hex signature
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn payload(&self) -> &TokenPayload {
        &self.payload
    }

    pub fn privileges(&self) -> &PrivilegeSet {
        &self.payload.privileges
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}

/// Issues tokens for a single issuer
#[derive(Clone)]
pub struct TokenBuilder {
    issuer: IssuerConfig,
    salt: Arc<dyn SaltSource>,
    clock: Arc<dyn Clock>,
}

impl TokenBuilder {
    /// Builder using OS entropy and the system clock
    pub fn new(issuer: IssuerConfig) -> Self {
        Self::with_sources(issuer, Arc::new(OsSalt), Arc::new(SystemClock))
    }

    pub fn with_sources(
        issuer: IssuerConfig,
        salt: Arc<dyn SaltSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            issuer,
            salt,
            clock,
        }
    }

    pub fn issuer(&self) -> &IssuerConfig {
        &self.issuer
    }

    /// Current time according to the builder's clock
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Verifier sharing this builder's issuer
    pub fn verifier(&self) -> TokenVerifier {
        TokenVerifier::new(self.issuer.clone())
    }

    /// Build a token for `user_id` to join `channel_name` with `role` until
    /// `expires_at` (unix seconds).
    pub fn build_token(
        &self,
        channel_name: &str,
        user_id: &UserId,
        role: Role,
        expires_at: u64,
    ) -> Result<SignedToken, TokenError> {
        let channel = Channel::parse(channel_name).map_err(TokenError::channel)?;
        let account = user_id.resolve().map_err(TokenError::user)?;

        let now = self.clock.now();
        if expires_at <= now {
            return Err(TokenError::ExpiredRequest { expires_at, now });
        }

        let secret = self.issuer.secret();
        let integrity = signer::sign(secret, self.issuer.issuer_id().as_bytes());
        let integrity =
            <[u8; DIGEST_LEN]>::try_from(integrity.as_slice()).map_err(|_| TokenError::Signature)?;

        let payload = TokenPayload {
            integrity,
            salt: self.salt.next_salt(),
            issued_at: now,
            privileges: PrivilegeSet::for_role(role, expires_at),
            channel_name: channel.as_str().to_string(),
            user_id: account,
        };

        let payload_b64 = URL_SAFE_NO_PAD.encode(payload.encode()?);

        let signature = signer::sign_hex(secret, payload_b64.as_bytes());
        if signature.len() != DIGEST_HEX_LEN {
            return Err(TokenError::Signature);
        }

        let token = format!(
            "{}{}{}{}",
            TOKEN_VERSION,
            self.issuer.issuer_id(),
            payload_b64,
            signature
        );

        debug!(channel = %channel, role = %role, expires_at, "Issued token");

        Ok(SignedToken {
            token,
            payload_b64,
            signature,
            payload,
        })
    }
}

impl fmt::Debug for TokenBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBuilder")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

/// Build a token with OS entropy and the system clock.
pub fn build_token(
    issuer_id: &str,
    issuer_secret: &str,
    channel_name: &str,
    user_id: &UserId,
    role: Role,
    expires_at: u64,
) -> Result<SignedToken, TokenError> {
    let issuer = IssuerConfig::new(issuer_id, issuer_secret)?;
    TokenBuilder::new(issuer).build_token(channel_name, user_id, role, expires_at)
}

/// Checks tokens issued under a known issuer identity
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    issuer: IssuerConfig,
}

impl TokenVerifier {
    pub fn new(issuer: IssuerConfig) -> Self {
        Self { issuer }
    }

    /// Parse a token string, check its signature and decode the payload
    pub fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        let Some(rest) = token.strip_prefix(TOKEN_VERSION) else {
            return match token.get(..TOKEN_VERSION.len()) {
                Some(version) => Err(TokenError::UnsupportedVersion(version.to_string())),
                None => Err(TokenError::InvalidFormat),
            };
        };

        let rest = rest
            .strip_prefix(self.issuer.issuer_id())
            .ok_or(TokenError::IssuerMismatch)?;

        let split = rest
            .len()
            .checked_sub(DIGEST_HEX_LEN)
            .ok_or(TokenError::InvalidFormat)?;
        let (payload_b64, signature_hex) = match (rest.get(..split), rest.get(split..)) {
            (Some(p), Some(s)) => (p, s),
            _ => return Err(TokenError::InvalidFormat),
        };

        let signature = hex::decode(signature_hex).map_err(|_| TokenError::InvalidFormat)?;
        if !signer::verify(self.issuer.secret(), payload_b64.as_bytes(), &signature) {
            return Err(TokenError::InvalidSignature);
        }

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| TokenError::Decode(e.to_string()))?;
        let payload = TokenPayload::decode(&payload_bytes)?;

        if !signer::verify(
            self.issuer.secret(),
            self.issuer.issuer_id().as_bytes(),
            &payload.integrity,
        ) {
            return Err(TokenError::IssuerMismatch);
        }

        Ok(payload)
    }

    /// Verify a token and check it grants `privilege` on `channel_name` to
    /// `user_id` at time `now`
    pub fn authorize(
        &self,
        token: &str,
        channel_name: &str,
        user_id: &UserId,
        privilege: PrivilegeKind,
        now: u64,
    ) -> Result<TokenPayload, TokenError> {
        let payload = self.verify(token)?;
        payload.authorize(channel_name, &user_id.to_string(), privilege, now)?;
        Ok(payload)
    }
}
