//! Keyed BLAKE2b-512 hashing (libsodium `crypto_generichash` with a key).

use blake2::digest::Mac;
use blake2::Blake2bMac512;
use subtle::ConstantTimeEq;

use crate::error::CryptoError;
use crate::types::CHECKSUM_LENGTH;

/// Compute a 64-byte keyed BLAKE2b hash.
///
/// # Arguments
/// * `key` - Hash key, 16 to 64 bytes (envelope nonce or signature salt)
/// * `message` - Bytes to hash
pub fn keyed_hash(key: &[u8], message: &[u8]) -> Result<[u8; CHECKSUM_LENGTH], CryptoError> {
    let mut mac = Blake2bMac512::new_from_slice(key).map_err(|_| {
        CryptoError::InvalidArgument(format!(
            "Hash key must be at most 64 bytes, got {}",
            key.len()
        ))
    })?;
    mac.update(message);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Recompute the keyed hash of `message` and compare it to `expected` in
/// constant time.
pub fn verify_keyed_hash(key: &[u8], message: &[u8], expected: &[u8]) -> Result<bool, CryptoError> {
    let computed = keyed_hash(key, message)?;
    Ok(computed[..].ct_eq(expected).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_64_bytes() {
        let hash = keyed_hash(&[1u8; 24], b"payload").unwrap();
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn deterministic() {
        let a = keyed_hash(&[1u8; 24], b"payload").unwrap();
        let b = keyed_hash(&[1u8; 24], b"payload").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn key_changes_output() {
        let a = keyed_hash(&[1u8; 24], b"payload").unwrap();
        let b = keyed_hash(&[2u8; 24], b"payload").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_message_with_salt_key() {
        // BLAKE2b-512 of "" keyed with the shared test salt
        let salt =
            hex::decode("79f118fc825d01b8b8ef84ed4020a38f6cb514607804514fa5b1e6ff542da722")
                .unwrap();
        let hash = keyed_hash(&salt, b"").unwrap();
        assert_eq!(
            crate::base64::base64_encode(&hash),
            "N1pQ53yIzsaOXB4d8eGW9NjZx7rq5LpvWMdXHjZc3szfD96u5diwFaExSa4Ze6yfC/T099OETLaffCWjMoHQzw=="
        );
    }

    #[test]
    fn verify_detects_mismatch() {
        let key = [9u8; 24];
        let mut hash = keyed_hash(&key, b"payload").unwrap();
        assert!(verify_keyed_hash(&key, b"payload", &hash).unwrap());
        hash[0] ^= 0x01;
        assert!(!verify_keyed_hash(&key, b"payload", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_short_expected() {
        let key = [9u8; 24];
        assert!(!verify_keyed_hash(&key, b"payload", &[0u8; 32]).unwrap());
    }

    #[test]
    fn rejects_oversized_key() {
        assert!(matches!(
            keyed_hash(&[0u8; 65], b"payload"),
            Err(CryptoError::InvalidArgument(_))
        ));
    }
}
