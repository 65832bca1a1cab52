//! Envelope encoder.
//!
//! v1: [box ciphertext]                    (nonce + signature sent out of band)
//! v2: [DE 25 90 02][nonce:24][sender pk:32][box ciphertext]
//!     [signing pk:32][signature:64][BLAKE2b-512(key=nonce, everything before)]

use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::Aead;
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use ed25519_dalek::SigningKey;
use zeroize::Zeroizing;

use crate::checksum::keyed_hash;
use crate::error::CryptoError;
use crate::keys::to_array;
use crate::signing::{sign_with, signing_key};
use crate::types::{
    Version, CHECKSUM_LENGTH, NONCE_LENGTH, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH,
    SIGNATURE_LENGTH, SIGNING_PUBLIC_KEY_LENGTH, VERSION_2_HEADER,
};

/// Encrypts and signs outgoing payloads.
///
/// A `Request` remembers the nonce of its last encryption so a v1 caller can
/// ship it alongside the ciphertext. Never encrypt two messages for the same
/// recipient with the same explicit nonce.
pub struct Request {
    secret_key: SecretKey,
    signing_key: SigningKey,
    nonce: Option<[u8; NONCE_LENGTH]>,
}

impl Request {
    /// # Arguments
    /// * `secret_key` - 32-byte X25519 secret key of the sender
    /// * `signature_secret_key` - 64-byte Ed25519 secret key used to sign payloads
    pub fn new(secret_key: &[u8], signature_secret_key: &[u8]) -> Result<Self, CryptoError> {
        let secret: Zeroizing<[u8; SECRET_KEY_LENGTH]> =
            Zeroizing::new(to_array("Secret key", secret_key)?);
        Ok(Self {
            secret_key: SecretKey::from(*secret),
            signing_key: signing_key(signature_secret_key)?,
            nonce: None,
        })
    }

    /// Encrypt a payload for `public_key`.
    ///
    /// # Arguments
    /// * `plaintext` - Raw request body
    /// * `public_key` - 32-byte X25519 public key of the recipient
    /// * `version` - Envelope format to produce
    /// * `nonce` - 24-byte nonce, or `None` to draw a fresh random one
    pub fn encrypt(
        &mut self,
        plaintext: &[u8],
        public_key: &[u8],
        version: Version,
        nonce: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let recipient: [u8; PUBLIC_KEY_LENGTH] = to_array("Public key", public_key)?;
        let nonce = match nonce {
            Some(n) => to_array("Nonce", n)?,
            None => random_nonce()?,
        };
        self.nonce = Some(nonce);

        let recipient = PublicKey::from(recipient);
        let body = seal(&self.secret_key, &recipient, &nonce, plaintext)?;

        let envelope = match version {
            Version::V1 => body,
            Version::V2 => self.assemble_v2(&nonce, &body, plaintext)?,
        };
        tracing::debug!(
            version = version.as_u8(),
            bytes = envelope.len(),
            "encrypted request"
        );
        Ok(envelope)
    }

    /// Ed25519 detached signature over `plaintext` with the held signing key.
    pub fn sign(&self, plaintext: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], CryptoError> {
        sign_with(&self.signing_key, plaintext)
    }

    /// Nonce used by the most recent `encrypt` call.
    pub fn nonce(&self) -> Option<&[u8; NONCE_LENGTH]> {
        self.nonce.as_ref()
    }

    fn assemble_v2(
        &self,
        nonce: &[u8; NONCE_LENGTH],
        body: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let sender_public_key = self.secret_key.public_key();
        let signature = self.sign(plaintext)?;
        let signing_public_key = self.signing_key.verifying_key().to_bytes();

        let mut envelope = Vec::with_capacity(
            VERSION_2_HEADER.len()
                + NONCE_LENGTH
                + PUBLIC_KEY_LENGTH
                + body.len()
                + SIGNING_PUBLIC_KEY_LENGTH
                + SIGNATURE_LENGTH
                + CHECKSUM_LENGTH,
        );
        envelope.extend_from_slice(&VERSION_2_HEADER);
        envelope.extend_from_slice(nonce);
        envelope.extend_from_slice(sender_public_key.as_bytes());
        envelope.extend_from_slice(body);
        envelope.extend_from_slice(&signing_public_key);
        envelope.extend_from_slice(&signature);

        let checksum = keyed_hash(nonce, &envelope)?;
        envelope.extend_from_slice(&checksum);
        Ok(envelope)
    }
}

/// Draw a random 24-byte box nonce.
pub fn random_nonce() -> Result<[u8; NONCE_LENGTH], CryptoError> {
    let mut nonce = [0u8; NONCE_LENGTH];
    getrandom::getrandom(&mut nonce).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(nonce)
}

fn seal(
    secret_key: &SecretKey,
    public_key: &PublicKey,
    nonce: &[u8; NONCE_LENGTH],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    SalsaBox::new(public_key, secret_key)
        .encrypt(GenericArray::from_slice(nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}
