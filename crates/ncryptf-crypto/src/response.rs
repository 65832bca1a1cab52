//! Envelope decoder.
//!
//! A version 2 envelope is verified in a fixed order: keyed checksum over the
//! raw bytes first, then box decryption, then the embedded Ed25519
//! signature. Nothing inside the envelope is interpreted before the
//! checksum matches.

use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::Aead;
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use zeroize::Zeroizing;

use crate::checksum::verify_keyed_hash;
use crate::encrypted_response::EncryptedResponse;
use crate::error::CryptoError;
use crate::keys::to_array;
use crate::signing::verify;
use crate::types::{
    Version, CHECKSUM_LENGTH, MAC_LENGTH, MIN_V2_ENVELOPE_LENGTH, NONCE_LENGTH, PUBLIC_KEY_LENGTH,
    SECRET_KEY_LENGTH, SIGNATURE_LENGTH, SIGNING_PUBLIC_KEY_LENGTH, VERSION_2_HEADER,
};

const NONCE_OFFSET: usize = VERSION_2_HEADER.len();
const PUBLIC_KEY_OFFSET: usize = NONCE_OFFSET + NONCE_LENGTH;
const BODY_OFFSET: usize = PUBLIC_KEY_OFFSET + PUBLIC_KEY_LENGTH;
/// Distance from the end of a v2 envelope to its signing public key.
const SIGNING_KEY_TAIL: usize = SIGNING_PUBLIC_KEY_LENGTH + SIGNATURE_LENGTH + CHECKSUM_LENGTH;

/// Decrypts and verifies incoming envelopes.
pub struct Response {
    secret_key: SecretKey,
}

impl Response {
    /// # Arguments
    /// * `secret_key` - 32-byte X25519 secret key of the recipient
    pub fn new(secret_key: &[u8]) -> Result<Self, CryptoError> {
        let secret: Zeroizing<[u8; SECRET_KEY_LENGTH]> =
            Zeroizing::new(to_array("Secret key", secret_key)?);
        Ok(Self {
            secret_key: SecretKey::from(*secret),
        })
    }

    /// Decrypt an envelope of either version.
    ///
    /// # Arguments
    /// * `envelope` - Raw envelope bytes
    /// * `public_key` - Sender's X25519 public key; required for v1, ignored for v2
    /// * `nonce` - 24-byte nonce; required for v1, optional for v2 (read
    ///   from the envelope when omitted)
    pub fn decrypt(
        &self,
        envelope: &[u8],
        public_key: Option<&[u8]>,
        nonce: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        match get_version(envelope)? {
            Version::V1 => {
                let (Some(public_key), Some(nonce)) = (public_key, nonce) else {
                    return Err(CryptoError::InvalidArgument(
                        "Public key and nonce are required to decrypt a version 1 envelope".into(),
                    ));
                };
                let public_key: [u8; PUBLIC_KEY_LENGTH] = to_array("Public key", public_key)?;
                let nonce: [u8; NONCE_LENGTH] = to_array("Nonce", nonce)?;
                open(&self.secret_key, &PublicKey::from(public_key), &nonce, envelope)
            }
            Version::V2 => self.decrypt_v2(envelope, nonce),
        }
    }

    /// Decrypt a v1 response delivered as separate parts, verifying its
    /// detached signature over the plaintext when one was supplied.
    pub fn decrypt_encrypted_response(
        &self,
        response: &EncryptedResponse,
    ) -> Result<Vec<u8>, CryptoError> {
        let plaintext = open(
            &self.secret_key,
            &PublicKey::from(response.public_key),
            &response.nonce,
            &response.body,
        )?;

        if let (Some(signature), Some(public_key)) =
            (&response.signature, &response.signature_public_key)
        {
            if !verify(&plaintext, signature, public_key)? {
                tracing::warn!(hash_id = %response.hash_id, "response signature rejected");
                return Err(CryptoError::InvalidSignature);
            }
        }
        Ok(plaintext)
    }

    /// Standalone Ed25519 verification, independent of any envelope.
    pub fn is_signature_valid(
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool, CryptoError> {
        verify(message, signature, public_key)
    }

    fn decrypt_v2(&self, envelope: &[u8], nonce: Option<&[u8]>) -> Result<Vec<u8>, CryptoError> {
        if envelope.len() < MIN_V2_ENVELOPE_LENGTH {
            return Err(CryptoError::InvalidArgument(format!(
                "Version 2 envelope must be at least {} bytes, got {}",
                MIN_V2_ENVELOPE_LENGTH,
                envelope.len()
            )));
        }

        let nonce: [u8; NONCE_LENGTH] = match nonce {
            Some(n) => to_array("Nonce", n)?,
            None => to_array("Nonce", &envelope[NONCE_OFFSET..PUBLIC_KEY_OFFSET])?,
        };

        let (payload, checksum) = envelope.split_at(envelope.len() - CHECKSUM_LENGTH);
        if !verify_keyed_hash(&nonce, payload, checksum)? {
            tracing::warn!(bytes = envelope.len(), "envelope checksum mismatch");
            return Err(CryptoError::InvalidChecksum);
        }

        let (rest, signature) = payload.split_at(payload.len() - SIGNATURE_LENGTH);
        let (rest, signing_public_key) = rest.split_at(rest.len() - SIGNING_PUBLIC_KEY_LENGTH);
        let sender_public_key: [u8; PUBLIC_KEY_LENGTH] =
            to_array("Public key", &rest[PUBLIC_KEY_OFFSET..BODY_OFFSET])?;
        let body = &rest[BODY_OFFSET..];

        let plaintext = open(
            &self.secret_key,
            &PublicKey::from(sender_public_key),
            &nonce,
            body,
        )?;

        if !verify(&plaintext, signature, signing_public_key)? {
            tracing::warn!("envelope signature rejected");
            return Err(CryptoError::InvalidSignature);
        }
        Ok(plaintext)
    }
}

/// Detect the envelope version from its leading bytes.
pub fn get_version(envelope: &[u8]) -> Result<Version, CryptoError> {
    if envelope.len() < MAC_LENGTH {
        return Err(CryptoError::InvalidArgument(format!(
            "Envelope must be at least {} bytes, got {}",
            MAC_LENGTH,
            envelope.len()
        )));
    }
    let version = if envelope.starts_with(&VERSION_2_HEADER) {
        Version::V2
    } else {
        Version::V1
    };
    tracing::debug!(version = version.as_u8(), bytes = envelope.len(), "detected envelope version");
    Ok(version)
}

/// Sender's X25519 public key embedded in a v2 envelope.
///
/// Read-only; the envelope is not authenticated by this call.
pub fn get_public_key_from_response(
    envelope: &[u8],
) -> Result<[u8; PUBLIC_KEY_LENGTH], CryptoError> {
    require_v2(envelope)?;
    to_array("Public key", &envelope[PUBLIC_KEY_OFFSET..BODY_OFFSET])
}

/// Ed25519 public key embedded in a v2 envelope, for comparison against a
/// key the caller already trusts.
pub fn get_signing_public_key_from_response(
    envelope: &[u8],
) -> Result<[u8; SIGNING_PUBLIC_KEY_LENGTH], CryptoError> {
    require_v2(envelope)?;
    let start = envelope.len() - SIGNING_KEY_TAIL;
    to_array(
        "Signing public key",
        &envelope[start..start + SIGNING_PUBLIC_KEY_LENGTH],
    )
}

fn require_v2(envelope: &[u8]) -> Result<(), CryptoError> {
    if get_version(envelope)? != Version::V2 || envelope.len() < MIN_V2_ENVELOPE_LENGTH {
        return Err(CryptoError::InvalidArgument(
            "Not a version 2 envelope".into(),
        ));
    }
    Ok(())
}

fn open(
    secret_key: &SecretKey,
    public_key: &PublicKey,
    nonce: &[u8; NONCE_LENGTH],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    SalsaBox::new(public_key, secret_key)
        .decrypt(GenericArray::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
