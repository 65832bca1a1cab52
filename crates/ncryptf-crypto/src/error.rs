use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Envelope checksum mismatch")]
    InvalidChecksum,

    #[error("Signature verification failed")]
    InvalidSignature,

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}

impl CryptoError {
    /// Shorthand for a length mismatch on a named input.
    pub(crate) fn length(what: &str, expected: usize, got: usize) -> Self {
        CryptoError::InvalidArgument(format!(
            "{} must be {} bytes, got {}",
            what, expected, got
        ))
    }
}
