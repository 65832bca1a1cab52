//! HKDF-SHA256 derivation of the per-request authentication key.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::AuthError;
use crate::types::{AUTH_INFO, AUTH_KEY_LENGTH};

/// Derive the 32-byte authentication key for one request.
///
/// # Arguments
/// * `ikm` - Token initial key material (32 bytes)
/// * `salt` - Per-request random salt
pub fn derive_auth_key(
    ikm: &[u8],
    salt: &[u8],
) -> Result<Zeroizing<[u8; AUTH_KEY_LENGTH]>, AuthError> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = Zeroizing::new([0u8; AUTH_KEY_LENGTH]);
    hk.expand(AUTH_INFO, okm.as_mut())
        .map_err(|e| AuthError::KeyDerivationFailed(format!("HKDF expand failed: {}", e)))?;
    Ok(okm)
}
