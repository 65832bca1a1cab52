//! Version 1 response whose key, nonce and signature arrive in transport
//! headers rather than inside the body.

use crate::base64::base64_decode;
use crate::error::CryptoError;
use crate::keys::to_array;
use crate::types::{NONCE_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, SIGNING_PUBLIC_KEY_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedResponse {
    /// Server's X25519 public key.
    pub public_key: [u8; PUBLIC_KEY_LENGTH],
    /// Nonce the body was sealed with.
    pub nonce: [u8; NONCE_LENGTH],
    /// Opaque identifier of the server key (e.g. an `X-HashId` header).
    pub hash_id: String,
    /// Box ciphertext.
    pub body: Vec<u8>,
    /// Detached signature over the plaintext, when the server supplied one.
    pub signature: Option<[u8; SIGNATURE_LENGTH]>,
    /// Public key for `signature`; present exactly when `signature` is.
    pub signature_public_key: Option<[u8; SIGNING_PUBLIC_KEY_LENGTH]>,
}

impl EncryptedResponse {
    /// Build from raw bytes.
    ///
    /// The signature is kept only when both the signature and its public key
    /// are given.
    pub fn new(
        public_key: &[u8],
        nonce: &[u8],
        hash_id: impl Into<String>,
        body: Vec<u8>,
        signature: Option<&[u8]>,
        signature_public_key: Option<&[u8]>,
    ) -> Result<Self, CryptoError> {
        let (signature, signature_public_key) = match (signature, signature_public_key) {
            (Some(sig), Some(pk)) => (
                Some(to_array("Signature", sig)?),
                Some(to_array("Signing public key", pk)?),
            ),
            _ => (None, None),
        };

        Ok(Self {
            public_key: to_array("Public key", public_key)?,
            nonce: to_array("Nonce", nonce)?,
            hash_id: hash_id.into(),
            body,
            signature,
            signature_public_key,
        })
    }

    /// Build from the Base64 strings a server returns in headers and body.
    pub fn from_base64(
        public_key: &str,
        nonce: &str,
        hash_id: impl Into<String>,
        body: &str,
        signature: Option<&str>,
        signature_public_key: Option<&str>,
    ) -> Result<Self, CryptoError> {
        let signature = signature.map(|s| decode("signature", s)).transpose()?;
        let signature_public_key = signature_public_key
            .map(|s| decode("signature public key", s))
            .transpose()?;

        Self::new(
            &decode("public key", public_key)?,
            &decode("nonce", nonce)?,
            hash_id,
            decode("body", body)?,
            signature.as_deref(),
            signature_public_key.as_deref(),
        )
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some() && self.signature_public_key.is_some()
    }
}

fn decode(what: &str, value: &str) -> Result<Vec<u8>, CryptoError> {
    base64_decode(value.trim())
        .map_err(|e| CryptoError::InvalidArgument(format!("Invalid base64 {}: {}", what, e)))
}
