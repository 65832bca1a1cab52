//! Ed25519 detached signatures over libsodium-format keys.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::to_array;
use crate::types::{SIGNATURE_LENGTH, SIGNING_PUBLIC_KEY_LENGTH, SIGNING_SECRET_KEY_LENGTH};

/// Load a 64-byte libsodium secret key (seed || public key).
///
/// Fails with `InvalidArgument` when the length is wrong or the trailing
/// public key does not belong to the seed.
pub(crate) fn signing_key(secret_key: &[u8]) -> Result<SigningKey, CryptoError> {
    let bytes: Zeroizing<[u8; SIGNING_SECRET_KEY_LENGTH]> =
        Zeroizing::new(to_array("Signing secret key", secret_key)?);
    SigningKey::from_keypair_bytes(&bytes)
        .map_err(|e| CryptoError::InvalidArgument(format!("Signing secret key: {}", e)))
}

/// Sign a message with Ed25519.
///
/// # Arguments
/// * `secret_key` - 64-byte Ed25519 secret key
/// * `message` - Message bytes to sign
///
/// # Returns
/// 64-byte detached signature
pub fn sign(secret_key: &[u8], message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], CryptoError> {
    let key = signing_key(secret_key)?;
    sign_with(&key, message)
}

pub(crate) fn sign_with(
    key: &SigningKey,
    message: &[u8],
) -> Result<[u8; SIGNATURE_LENGTH], CryptoError> {
    let signature: Signature = key
        .try_sign(message)
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
    Ok(signature.to_bytes())
}

/// Verify an Ed25519 detached signature.
///
/// Malformed lengths are an `InvalidArgument`; a well-formed signature that
/// does not verify (including one made for a non-curve public key) is
/// `Ok(false)`.
pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool, CryptoError> {
    let signature: [u8; SIGNATURE_LENGTH] = to_array("Signature", signature)?;
    let public_key: [u8; SIGNING_PUBLIC_KEY_LENGTH] =
        to_array("Signing public key", public_key)?;

    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key) else {
        return Ok(false);
    };
    let signature = Signature::from_bytes(&signature);
    Ok(verifying_key.verify(message, &signature).is_ok())
}
