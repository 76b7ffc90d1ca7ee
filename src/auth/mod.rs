//! Token issuing and verification
//!
//! Token layout:
//! - `006` version tag
//! - issuer id
//! - base64url payload: issuer integrity value, salt, issue time, privileges,
//!   channel and user binding
//! - lowercase hex HMAC-SHA256 of the payload text
//!
//! Privileges:
//! - `join_channel`: always granted
//! - `publish_audio`, `publish_video`, `publish_data`: publishers only

mod payload;
mod privileges;
pub mod signer;
mod source;
mod tokens;

pub use payload::TokenPayload;
pub use privileges::{Privilege, PrivilegeKind, PrivilegeSet, Role};
pub use source::{Clock, FixedClock, FixedSalt, OsSalt, SaltSource, SystemClock};
pub use tokens::{build_token, SignedToken, TokenBuilder, TokenError, TokenVerifier, TOKEN_VERSION};
