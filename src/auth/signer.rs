//! Keyed message authentication

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 digest in bytes
pub const DIGEST_LEN: usize = 32;

/// Length of a hex-rendered digest
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// Compute HMAC-SHA256 of `message` keyed by `secret`.
pub fn sign(secret: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Compute HMAC-SHA256 and render it as lowercase hex.
pub fn sign_hex(secret: &[u8], message: &[u8]) -> String {
    hex::encode(sign(secret, message))
}

/// Check `digest` against the HMAC of `message` in constant time.
pub fn verify(secret: &[u8], message: &[u8], digest: &[u8]) -> bool {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(message);
    mac.verify_slice(digest).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_is_deterministic() {
        let a = sign(b"cert456", b"app123");
        let b = sign(b"cert456", b"app123");
        assert_eq!(a, b);
        assert_eq!(a.len(), DIGEST_LEN);
    }

    #[test]
    fn test_sign_depends_on_key() {
        assert_ne!(sign(b"key-a", b"message"), sign(b"key-b", b"message"));
    }

    #[test]
    fn test_sign_hex_known_vector() {
        // RFC 4231 test case 2
        let digest = sign_hex(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            digest,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
    }

    #[test]
    fn test_verify() {
        let digest = sign(b"secret", b"payload");
        assert!(verify(b"secret", b"payload", &digest));
        assert!(!verify(b"secret", b"payload!", &digest));
        assert!(!verify(b"other", b"payload", &digest));
        assert!(!verify(b"secret", b"payload", &digest[..16]));
    }
}
