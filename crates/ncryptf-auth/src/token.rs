//! Server-issued credential set.

use std::fmt;

use chrono::Utc;
use ncryptf_crypto::{
    base64_decode, signing_public_key, SIGNING_PUBLIC_KEY_LENGTH, SIGNING_SECRET_KEY_LENGTH,
};
use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::AuthError;
use crate::types::IKM_LENGTH;

/// Access/refresh tokens plus the key material bound to them.
///
/// Read-only once built; secret fields are zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    ikm: [u8; IKM_LENGTH],
    signature: [u8; SIGNING_SECRET_KEY_LENGTH],
    /// Unix timestamp (seconds).
    pub expires_at: i64,
}

/// Token document as returned by the authentication endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Base64 initial key material.
    pub ikm: String,
    /// Base64 Ed25519 secret key.
    pub signing: String,
    pub expires_at: i64,
}

impl Token {
    /// # Arguments
    /// * `access_token` - Access token returned by the API
    /// * `refresh_token` - Refresh token returned by the API
    /// * `ikm` - 32-byte initial key material
    /// * `signature` - 64-byte Ed25519 secret key issued with the token
    /// * `expires_at` - Expiry as a unix timestamp
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        ikm: &[u8],
        signature: &[u8],
        expires_at: i64,
    ) -> Result<Self, AuthError> {
        let ikm: [u8; IKM_LENGTH] = ikm.try_into().map_err(|_| {
            AuthError::InvalidArgument(format!(
                "Initial key material must be {} bytes, got {}",
                IKM_LENGTH,
                ikm.len()
            ))
        })?;
        let signature: [u8; SIGNING_SECRET_KEY_LENGTH] = signature.try_into().map_err(|_| {
            AuthError::InvalidArgument(format!(
                "Signing secret key must be {} bytes, got {}",
                SIGNING_SECRET_KEY_LENGTH,
                signature.len()
            ))
        })?;

        Ok(Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            ikm,
            signature,
            expires_at,
        })
    }

    /// Parse the JSON token document.
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let response: TokenResponse = serde_json::from_str(json)?;
        Self::try_from(response)
    }

    pub fn ikm(&self) -> &[u8; IKM_LENGTH] {
        &self.ikm
    }

    /// The Ed25519 secret key issued with this token.
    pub fn signature(&self) -> &[u8; SIGNING_SECRET_KEY_LENGTH] {
        &self.signature
    }

    /// Ed25519 public key derived from the token's signing secret key.
    ///
    /// Compare with the key embedded in a response envelope to confirm the
    /// response came from the party that issued this token.
    pub fn signing_public_key(&self) -> Result<[u8; SIGNING_PUBLIC_KEY_LENGTH], AuthError> {
        Ok(signing_public_key(&self.signature)?)
    }

    /// `true` once the current time is past `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_at
    }
}

impl TryFrom<TokenResponse> for Token {
    type Error = AuthError;

    fn try_from(response: TokenResponse) -> Result<Self, Self::Error> {
        let ikm = Zeroizing::new(decode("ikm", &response.ikm)?);
        let signing = Zeroizing::new(decode("signing", &response.signing)?);
        Token::new(
            response.access_token,
            response.refresh_token,
            &ikm,
            &signing,
            response.expires_at,
        )
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &self.access_token)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

fn decode(field: &str, value: &str) -> Result<Vec<u8>, AuthError> {
    base64_decode(value).map_err(|e| AuthError::Base64Decode(format!("{}: {}", field, e)))
}
