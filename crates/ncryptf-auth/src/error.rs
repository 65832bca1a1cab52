use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Malformed authorization header: {0}")]
    MalformedHeader(String),

    #[error("Base64 decode error: {0}")]
    Base64Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Crypto error: {0}")]
    Crypto(#[from] ncryptf_crypto::CryptoError),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}
