//! Request authorization for ncryptf APIs: tokens, canonical request
//! signatures and the HKDF/HMAC `Authorization` header.

pub mod authorization;
pub mod date;
pub mod error;
pub mod hkdf;
pub mod signature;
pub mod token;
pub mod types;

pub use authorization::{Authorization, ParsedAuthorization};
pub use date::{format_rfc1123, parse_rfc1123};
pub use error::AuthError;
pub use hkdf::derive_auth_key;
pub use token::{Token, TokenResponse};
pub use types::{
    AUTH_INFO, AUTH_KEY_LENGTH, DATE_HEADER, DEFAULT_DRIFT_ALLOWANCE, HEADER_PREFIX, HMAC_LENGTH,
    IKM_LENGTH, SALT_LENGTH,
};

pub use ncryptf_crypto::Version;
