//! Canonical binary layout of the signed token payload
//!
//! All integers are little-endian:
//!
//! ```text
//! integrity     [u8; 32]   HMAC-SHA256(secret, issuer id)
//! salt          u32
//! issued_at     u64
//! count         u16
//! privileges    count x { kind: u16, expires_at: u64 }, sorted by kind
//! channel       u16 length + UTF-8
//! user          u16 length + UTF-8
//! ```

use crate::auth::privileges::{Privilege, PrivilegeKind, PrivilegeSet};
use crate::auth::signer::DIGEST_LEN;
use crate::auth::tokens::TokenError;
use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;

/// Decoded contents of a token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    /// Binds the payload to the issuer identity
    #[serde(serialize_with = "hex_bytes")]
    pub integrity: [u8; DIGEST_LEN],
    pub salt: u32,
    pub issued_at: u64,
    pub privileges: PrivilegeSet,
    pub channel_name: String,
    pub user_id: String,
}

impl TokenPayload {
    /// Check the token is bound to `channel_name` and `user_id` and grants
    /// an unexpired `kind` at `now`
    pub fn authorize(
        &self,
        channel_name: &str,
        user_id: &str,
        kind: PrivilegeKind,
        now: u64,
    ) -> Result<(), TokenError> {
        if self.channel_name != channel_name || self.user_id != user_id {
            return Err(TokenError::ChannelMismatch);
        }

        match self.privileges.get(kind) {
            None => Err(TokenError::PrivilegeDenied(kind)),
            Some(privilege) if !privilege.is_valid_at(now) => Err(TokenError::Expired(kind)),
            Some(_) => Ok(()),
        }
    }

    /// Serialize to the canonical byte layout
    pub fn encode(&self) -> Result<Vec<u8>, TokenError> {
        let mut buf = BytesMut::with_capacity(
            DIGEST_LEN + 4 + 8 + 2 + self.privileges.len() * 10 + 4
                + self.channel_name.len()
                + self.user_id.len(),
        );

        buf.put_slice(&self.integrity);
        buf.put_u32_le(self.salt);
        buf.put_u64_le(self.issued_at);

        buf.put_u16_le(self.privileges.len() as u16);
        for privilege in self.privileges.privileges() {
            buf.put_u16_le(privilege.kind.tag());
            buf.put_u64_le(privilege.expires_at);
        }

        put_string(&mut buf, "channelName", &self.channel_name)?;
        put_string(&mut buf, "uid", &self.user_id)?;

        Ok(buf.to_vec())
    }

    /// Parse the canonical byte layout. Trailing bytes are rejected.
    pub fn decode(mut data: &[u8]) -> Result<Self, TokenError> {
        let buf = &mut data;

        let mut integrity = [0u8; DIGEST_LEN];
        ensure(buf, DIGEST_LEN, "integrity")?;
        buf.copy_to_slice(&mut integrity);

        ensure(buf, 4 + 8 + 2, "header")?;
        let salt = buf.get_u32_le();
        let issued_at = buf.get_u64_le();
        let count = buf.get_u16_le() as usize;

        let mut privileges = PrivilegeSet::new();
        let mut last_tag = 0u16;
        for _ in 0..count {
            ensure(buf, 2 + 8, "privilege")?;
            let tag = buf.get_u16_le();
            let expires_at = buf.get_u64_le();

            let kind = PrivilegeKind::from_tag(tag)
                .ok_or_else(|| TokenError::Decode(format!("unknown privilege tag {}", tag)))?;
            if tag <= last_tag {
                return Err(TokenError::Decode("privileges out of order".to_string()));
            }
            last_tag = tag;

            privileges.add(Privilege::new(kind, expires_at));
        }

        let channel_name = get_string(buf, "channel")?;
        let user_id = get_string(buf, "user")?;

        if buf.has_remaining() {
            return Err(TokenError::Decode(format!(
                "{} trailing bytes",
                buf.remaining()
            )));
        }

        Ok(Self {
            integrity,
            salt,
            issued_at,
            privileges,
            channel_name,
            user_id,
        })
    }
}

fn ensure(buf: &&[u8], needed: usize, what: &str) -> Result<(), TokenError> {
    if buf.remaining() < needed {
        return Err(TokenError::Decode(format!("truncated {}", what)));
    }
    Ok(())
}

fn put_string(buf: &mut BytesMut, field: &'static str, value: &str) -> Result<(), TokenError> {
    let len = u16::try_from(value.len()).map_err(|_| TokenError::InvalidRequest {
        field,
        reason: "too long".to_string(),
    })?;
    buf.put_u16_le(len);
    buf.put_slice(value.as_bytes());
    Ok(())
}

fn get_string(buf: &mut &[u8], what: &str) -> Result<String, TokenError> {
    ensure(buf, 2, what)?;
    let len = buf.get_u16_le() as usize;
    ensure(buf, len, what)?;
    let value = buf.copy_to_bytes(len);
    String::from_utf8(value.to_vec())
        .map_err(|_| TokenError::Decode(format!("{} is not valid UTF-8", what)))
}

fn hex_bytes<S>(bytes: &[u8; DIGEST_LEN], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::privileges::Role;

    fn sample() -> TokenPayload {
        TokenPayload {
            integrity: [0xab; DIGEST_LEN],
            salt: 0x0102_0304,
            issued_at: 1_700_000_000,
            privileges: PrivilegeSet::for_role(Role::Subscriber, 1_700_003_600),
            channel_name: "room1".to_string(),
            user_id: "42".to_string(),
        }
    }

    #[test]
    fn test_encode_layout() {
        let bytes = sample().encode().unwrap();

        assert_eq!(&bytes[..32], &[0xab; 32]);
        assert_eq!(&bytes[32..36], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[36..44], &1_700_000_000u64.to_le_bytes());
        assert_eq!(&bytes[44..46], &[1, 0]);
        assert_eq!(&bytes[46..48], &[1, 0]);
        assert_eq!(&bytes[48..56], &1_700_003_600u64.to_le_bytes());
        assert_eq!(&bytes[56..58], &[5, 0]);
        assert_eq!(&bytes[58..63], b"room1");
        assert_eq!(&bytes[63..65], &[2, 0]);
        assert_eq!(&bytes[65..], b"42");
    }

    #[test]
    fn test_decode_publisher() {
        let mut payload = sample();
        payload.privileges = PrivilegeSet::for_role(Role::Publisher, 99);

        let decoded = TokenPayload::decode(&payload.encode().unwrap()).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(decoded.privileges.kinds(), PrivilegeKind::ALL.to_vec());
    }

    #[test]
    fn test_decode_rejects_truncation() {
        let bytes = sample().encode().unwrap();
        for len in [0, 31, 40, 50, bytes.len() - 1] {
            assert!(matches!(
                TokenPayload::decode(&bytes[..len]),
                Err(TokenError::Decode(_))
            ));
        }
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut bytes = sample().encode().unwrap();
        bytes.push(0);
        assert!(matches!(
            TokenPayload::decode(&bytes),
            Err(TokenError::Decode(_))
        ));
    }

    #[test]
    fn test_authorize() {
        let payload = sample();
        let expiry = 1_700_003_600;

        assert!(payload
            .authorize("room1", "42", PrivilegeKind::JoinChannel, expiry - 1)
            .is_ok());
        assert!(matches!(
            payload.authorize("room1", "42", PrivilegeKind::JoinChannel, expiry),
            Err(TokenError::Expired(PrivilegeKind::JoinChannel))
        ));
        assert!(matches!(
            payload.authorize("room1", "42", PrivilegeKind::PublishVideo, 0),
            Err(TokenError::PrivilegeDenied(PrivilegeKind::PublishVideo))
        ));
        assert!(matches!(
            payload.authorize("room2", "42", PrivilegeKind::JoinChannel, 0),
            Err(TokenError::ChannelMismatch)
        ));
        assert!(matches!(
            payload.authorize("room1", "43", PrivilegeKind::JoinChannel, 0),
            Err(TokenError::ChannelMismatch)
        ));
    }

    #[test]
    fn test_decode_rejects_unordered_privileges() {
        let mut payload = sample();
        payload.privileges = PrivilegeSet::for_role(Role::Publisher, 99);
        let bytes = payload.encode().unwrap();

        // Privilege entries start at 46, 10 bytes each
        let mut swapped = bytes.clone();
        swapped[46..56].copy_from_slice(&bytes[56..66]);
        swapped[56..66].copy_from_slice(&bytes[46..56]);
        assert!(matches!(
            TokenPayload::decode(&swapped),
            Err(TokenError::Decode(msg)) if msg.contains("out of order")
        ));

        let mut duplicated = bytes.clone();
        duplicated[56..66].copy_from_slice(&bytes[46..56]);
        assert!(matches!(
            TokenPayload::decode(&duplicated),
            Err(TokenError::Decode(msg)) if msg.contains("out of order")
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_tag() {
        let mut bytes = sample().encode().unwrap();
        bytes[46] = 9;
        assert!(matches!(
            TokenPayload::decode(&bytes),
            Err(TokenError::Decode(_))
        ));
    }
}
