//! Envelope codec: NaCl box encryption with embedded Ed25519 signatures and
//! a keyed BLAKE2b checksum, plus the key material it runs on.

pub mod base64;
pub mod checksum;
pub mod encrypted_response;
pub mod error;
pub mod keys;
pub mod request;
pub mod response;
pub mod signing;
pub mod types;

pub use base64::{base64_decode, base64_encode};
pub use checksum::{keyed_hash, verify_keyed_hash};
pub use encrypted_response::EncryptedResponse;
pub use error::CryptoError;
pub use keys::{
    box_public_key, generate_keypair, generate_signing_keypair, signing_public_key, zero, Keypair,
    SigningKeypair,
};
pub use request::{random_nonce, Request};
pub use response::{
    get_public_key_from_response, get_signing_public_key_from_response, get_version, Response,
};
pub use signing::{sign, verify};
pub use types::{
    Version, CHECKSUM_LENGTH, MIN_V2_ENVELOPE_LENGTH, NONCE_LENGTH, PUBLIC_KEY_LENGTH,
    SECRET_KEY_LENGTH, SIGNATURE_LENGTH, SIGNING_PUBLIC_KEY_LENGTH, SIGNING_SECRET_KEY_LENGTH,
    VERSION_2_HEADER,
};
