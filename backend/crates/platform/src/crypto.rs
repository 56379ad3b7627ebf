//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Encode bytes as unpadded base64url
pub fn to_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url
pub fn from_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s)
}

fn mac_for(key: &[u8], data: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac
}

/// Compute HMAC-SHA256 of `data` and return it base64url-encoded
pub fn sign(key: &[u8], data: &[u8]) -> String {
    to_base64url(&mac_for(key, data).finalize().into_bytes())
}

/// Verify a base64url signature produced by [`sign`]
///
/// Comparison is constant-time.
pub fn verify(key: &[u8], data: &[u8], signature_b64: &str) -> bool {
    let Ok(signature) = from_base64url(signature_b64) else {
        return false;
    };
    mac_for(key, data).verify_slice(&signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32);
        assert_eq!(bytes.len(), 32);
        // Should not be all zeros (statistically)
        assert!(bytes.iter().any(|&b| b != 0));
        assert_ne!(bytes, random_bytes(32));
    }

    #[test]
    fn test_sign_and_verify() {
        let key = [42u8; 32];
        let sig = sign(&key, b"session-id");

        assert!(verify(&key, b"session-id", &sig));
        assert!(!verify(&key, b"other-id", &sig));
        assert!(!verify(&[43u8; 32], b"session-id", &sig));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let key = [1u8; 32];
        assert!(!verify(&key, b"data", "not base64 !!"));
        assert!(!verify(&key, b"data", ""));
    }

    #[test]
    fn test_signature_is_url_safe() {
        let sig = sign(&[7u8; 32], b"payload");
        assert!(!sig.contains('+') && !sig.contains('/') && !sig.contains('='));
    }
}
