//! Channel names and user identifiers
//!
//! A channel name is 1 to 64 bytes drawn from:
//! `a-z A-Z 0-9 space ! # $ % & ( ) + - : ; < = . > ? @ [ ] ^ _ { | } ~ ,`
//!
//! A user id is either an integer (rendered in decimal, negative values
//! included) or an account string of 1 to 255 bytes. Both forms bind by their string representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum channel name length in bytes
pub const MAX_CHANNEL_LEN: usize = 64;

/// Maximum user account length in bytes
pub const MAX_ACCOUNT_LEN: usize = 255;

const CHANNEL_PUNCTUATION: &str = " !#$%&()+-:;<=.>?@[]^_{|}~,";

fn is_valid_channel_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || CHANNEL_PUNCTUATION.contains(c)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel name cannot be empty")]
    Empty,

    #[error("channel name is {0} bytes, maximum is {max}", max = MAX_CHANNEL_LEN)]
    TooLong(usize),

    #[error("invalid character {0:?} in channel name")]
    InvalidChar(char),

    #[error("user id cannot be empty")]
    EmptyUser,

    #[error("user id is {0} bytes, maximum is {max}", max = MAX_ACCOUNT_LEN)]
    UserTooLong(usize),
}

/// A validated channel name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    name: String,
}

impl Channel {
    /// Parse and validate a channel name
    pub fn parse(name: &str) -> Result<Self, ChannelError> {
        if name.is_empty() {
            return Err(ChannelError::Empty);
        }

        if name.len() > MAX_CHANNEL_LEN {
            return Err(ChannelError::TooLong(name.len()));
        }

        if let Some(c) = name.chars().find(|c| !is_valid_channel_char(*c)) {
            return Err(ChannelError::InvalidChar(c));
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A client identifier, numeric or account string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(u64),
    Signed(i64),
    Account(String),
}

impl UserId {
    /// Accept a JSON string or integer
    pub fn from_json(value: &serde_json::Value) -> Option<UserId> {
        match value {
            serde_json::Value::String(s) => Some(UserId::Account(s.clone())),
            serde_json::Value::Number(n) => n
                .as_u64()
                .map(UserId::Numeric)
                .or_else(|| n.as_i64().map(UserId::Signed)),
            _ => None,
        }
    }

    /// Resolve to the string form bound into tokens
    pub fn resolve(&self) -> Result<String, ChannelError> {
        let account = self.to_string();
        if account.is_empty() {
            return Err(ChannelError::EmptyUser);
        }
        if account.len() > MAX_ACCOUNT_LEN {
            return Err(ChannelError::UserTooLong(account.len()));
        }
        Ok(account)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Numeric(n) => write!(f, "{}", n),
            UserId::Signed(n) => write!(f, "{}", n),
            UserId::Account(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for UserId {
    fn from(n: u64) -> Self {
        UserId::Numeric(n)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId::Account(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId::Account(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse_valid() {
        assert!(Channel::parse("room1").is_ok());
        assert!(Channel::parse("Team Standup #4").is_ok());
        assert!(Channel::parse("a.b-c_d:e[f]{g}|h~i,j").is_ok());
        assert!(Channel::parse(&"x".repeat(MAX_CHANNEL_LEN)).is_ok());
    }

    #[test]
    fn test_channel_parse_invalid() {
        assert_eq!(Channel::parse(""), Err(ChannelError::Empty));
        assert_eq!(
            Channel::parse(&"x".repeat(MAX_CHANNEL_LEN + 1)),
            Err(ChannelError::TooLong(MAX_CHANNEL_LEN + 1))
        );
        assert_eq!(Channel::parse("room/1"), Err(ChannelError::InvalidChar('/')));
        assert_eq!(Channel::parse("caf\u{e9}"), Err(ChannelError::InvalidChar('\u{e9}')));
    }

    #[test]
    fn test_user_id_resolve() {
        assert_eq!(UserId::Numeric(42).resolve().unwrap(), "42");
        assert_eq!(UserId::Numeric(0).resolve().unwrap(), "0");
        assert_eq!(UserId::from("alice").resolve().unwrap(), "alice");
        assert_eq!(UserId::from("").resolve(), Err(ChannelError::EmptyUser));
        assert_eq!(
            UserId::from("u".repeat(256)).resolve(),
            Err(ChannelError::UserTooLong(256))
        );
    }

    #[test]
    fn test_user_id_deserialize_untagged() {
        let n: UserId = serde_json::from_str("42").unwrap();
        let s: UserId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(n, UserId::Numeric(42));
        assert_eq!(s, UserId::Account("42".to_string()));
        assert_eq!(n.resolve().unwrap(), s.resolve().unwrap());

        let neg: UserId = serde_json::from_str("-7").unwrap();
        assert_eq!(neg, UserId::Signed(-7));
        assert_eq!(neg.resolve().unwrap(), "-7");
    }

    #[test]
    fn test_user_id_from_json() {
        use serde_json::json;

        assert_eq!(UserId::from_json(&json!(42)), Some(UserId::Numeric(42)));
        assert_eq!(UserId::from_json(&json!(-42)), Some(UserId::Signed(-42)));
        assert_eq!(
            UserId::from_json(&json!("alice")),
            Some(UserId::Account("alice".to_string()))
        );
        assert_eq!(UserId::from_json(&json!(1.5)), None);
        assert_eq!(UserId::from_json(&json!(true)), None);
        assert_eq!(UserId::from_json(&json!(null)), None);
    }
}
