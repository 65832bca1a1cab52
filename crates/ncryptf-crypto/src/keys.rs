//! Validated key material for box encryption and Ed25519 signing.
//!
//! Lengths are checked once, at construction, so everything downstream can
//! treat a `Keypair` or `SigningKeypair` as well formed. Secret bytes are
//! zeroed when the value is dropped.

use std::fmt;

use crypto_box::SecretKey;
use ed25519_dalek::SigningKey;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::CryptoError;
use crate::types::{
    PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNING_PUBLIC_KEY_LENGTH, SIGNING_SECRET_KEY_LENGTH,
};

/// X25519 key pair used for box encryption.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Keypair {
    public_key: [u8; PUBLIC_KEY_LENGTH],
    secret_key: [u8; SECRET_KEY_LENGTH],
}

impl Keypair {
    /// Build a key pair from raw bytes.
    ///
    /// # Arguments
    /// * `secret_key` - 32-byte X25519 secret key
    /// * `public_key` - 32-byte X25519 public key
    pub fn new(secret_key: &[u8], public_key: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self {
            public_key: to_array("Public key", public_key)?,
            secret_key: to_array("Secret key", secret_key)?,
        })
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.public_key
    }

    pub fn secret_key(&self) -> &[u8; SECRET_KEY_LENGTH] {
        &self.secret_key
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Ed25519 key pair in libsodium layout (secret key = seed || public key).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKeypair {
    public_key: [u8; SIGNING_PUBLIC_KEY_LENGTH],
    secret_key: [u8; SIGNING_SECRET_KEY_LENGTH],
}

impl SigningKeypair {
    /// Build a signing key pair from raw bytes.
    ///
    /// # Arguments
    /// * `secret_key` - 64-byte Ed25519 secret key
    /// * `public_key` - 32-byte Ed25519 public key
    pub fn new(secret_key: &[u8], public_key: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self {
            public_key: to_array("Signing public key", public_key)?,
            secret_key: to_array("Signing secret key", secret_key)?,
        })
    }

    pub fn public_key(&self) -> &[u8; SIGNING_PUBLIC_KEY_LENGTH] {
        &self.public_key
    }

    pub fn secret_key(&self) -> &[u8; SIGNING_SECRET_KEY_LENGTH] {
        &self.secret_key
    }
}

impl fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeypair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Generate a fresh X25519 key pair from the OS CSPRNG.
pub fn generate_keypair() -> Result<Keypair, CryptoError> {
    let mut secret = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
    getrandom::getrandom(secret.as_mut()).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    let public = box_public_key(secret.as_ref())?;
    Keypair::new(secret.as_ref(), &public)
}

/// Generate a fresh Ed25519 key pair from the OS CSPRNG.
pub fn generate_signing_keypair() -> Result<SigningKeypair, CryptoError> {
    let mut seed = Zeroizing::new([0u8; 32]);
    getrandom::getrandom(seed.as_mut()).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    let signing_key = SigningKey::from_bytes(&seed);
    let secret = Zeroizing::new(signing_key.to_keypair_bytes());
    SigningKeypair::new(secret.as_ref(), signing_key.verifying_key().as_bytes())
}

/// Derive the X25519 public key for a box secret key (base-point multiplication).
pub fn box_public_key(secret_key: &[u8]) -> Result<[u8; PUBLIC_KEY_LENGTH], CryptoError> {
    let bytes: Zeroizing<[u8; SECRET_KEY_LENGTH]> =
        Zeroizing::new(to_array("Secret key", secret_key)?);
    let secret = SecretKey::from(*bytes);
    Ok(*secret.public_key().as_bytes())
}

/// Derive the Ed25519 public key from a 64-byte signing secret key.
///
/// The public half is recomputed from the seed rather than copied from the
/// trailing 32 bytes.
pub fn signing_public_key(
    secret_key: &[u8],
) -> Result<[u8; SIGNING_PUBLIC_KEY_LENGTH], CryptoError> {
    if secret_key.len() != SIGNING_SECRET_KEY_LENGTH {
        return Err(CryptoError::length(
            "Signing secret key",
            SIGNING_SECRET_KEY_LENGTH,
            secret_key.len(),
        ));
    }
    let seed: Zeroizing<[u8; 32]> = Zeroizing::new(to_array("Signing seed", &secret_key[..32])?);
    Ok(SigningKey::from_bytes(&seed).verifying_key().to_bytes())
}

/// Overwrite a buffer with zeros.
///
/// Returns `true` once every byte reads back as zero.
pub fn zero(data: &mut [u8]) -> bool {
    data.zeroize();
    data.iter().all(|b| *b == 0)
}

/// Copy a slice into a fixed-size array, rejecting any other length.
pub(crate) fn to_array<const N: usize>(what: &str, bytes: &[u8]) -> Result<[u8; N], CryptoError> {
    bytes
        .try_into()
        .map_err(|_| CryptoError::length(what, N, bytes.len()))
}
