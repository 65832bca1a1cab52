//! Canonical request signature string.
//!
//! ```text
//! <payload hash>
//! <METHOD>+<uri>
//! <RFC 1123 date>
//! <base64 salt>
//! ```
//!
//! v1 hashes the payload with SHA-256 (lowercase hex) after turning `\/`
//! back into `/`; v2 uses BLAKE2b-512 keyed with the salt (Base64).

use chrono::{DateTime, Utc};
use ncryptf_crypto::{base64_encode, keyed_hash, Version};
use sha2::{Digest, Sha256};

use crate::date::format_rfc1123;
use crate::error::AuthError;
use crate::types::SALT_LENGTH;

/// Build the signature string for one request.
///
/// # Arguments
/// * `method` - HTTP method, any case
/// * `uri` - Request URI including query string
/// * `salt` - 32-byte per-request salt
/// * `date` - Request date
/// * `payload` - Raw request body (empty for bodiless requests)
/// * `version` - Hash version
pub fn derive(
    method: &str,
    uri: &str,
    salt: &[u8; SALT_LENGTH],
    date: &DateTime<Utc>,
    payload: &[u8],
    version: Version,
) -> Result<String, AuthError> {
    let hash = payload_hash(payload, salt, version)?;
    Ok(format!(
        "{}\n{}+{}\n{}\n{}",
        hash,
        method.to_uppercase(),
        uri,
        format_rfc1123(date),
        base64_encode(salt)
    ))
}

/// First line of the signature string.
pub fn payload_hash(
    payload: &[u8],
    salt: &[u8; SALT_LENGTH],
    version: Version,
) -> Result<String, AuthError> {
    match version {
        Version::V1 => Ok(hex::encode(Sha256::digest(unescape_slashes(payload)))),
        Version::V2 => Ok(base64_encode(&keyed_hash(salt, payload)?)),
    }
}

/// Replace every `\/` with `/`, scanning left to right.
fn unescape_slashes(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len());
    let mut i = 0;
    while i < payload.len() {
        if payload[i] == b'\\' && payload.get(i + 1) == Some(&b'/') {
            out.push(b'/');
            i += 2;
        } else {
            out.push(payload[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> DateTime<Utc> {
        DateTime::from_timestamp(1533310068, 0).unwrap()
    }

    #[test]
    fn four_lines() {
        let salt = [1u8; 32];
        let s = derive("get", "/api/v1/test", &salt, &date(), b"", Version::V2).unwrap();
        let lines: Vec<&str> = s.split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "GET+/api/v1/test");
        assert_eq!(lines[2], "Fri, 03 Aug 2018 15:27:48 +0000");
        assert_eq!(lines[3], base64_encode(&salt));
    }

    #[test]
    fn deterministic() {
        let salt = [5u8; 32];
        let a = derive("POST", "/x", &salt, &date(), b"{\"a\":1}", Version::V2).unwrap();
        let b = derive("POST", "/x", &salt, &date(), b"{\"a\":1}", Version::V2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn v1_empty_payload_is_sha256_of_nothing() {
        let hash = payload_hash(b"", &[0u8; 32], Version::V1).unwrap();
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn v1_ignores_escaped_slashes() {
        let escaped = payload_hash(br#"{"url":"a\/b"}"#, &[0u8; 32], Version::V1).unwrap();
        let plain = payload_hash(br#"{"url":"a/b"}"#, &[0u8; 32], Version::V1).unwrap();
        assert_eq!(escaped, plain);
    }

    #[test]
    fn v2_depends_on_salt() {
        let a = payload_hash(b"body", &[1u8; 32], Version::V2).unwrap();
        let b = payload_hash(b"body", &[2u8; 32], Version::V2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unescape_handles_edges() {
        assert_eq!(unescape_slashes(b"\\"), b"\\");
        assert_eq!(unescape_slashes(b"\\\\/"), b"\\/");
        assert_eq!(unescape_slashes(b"\\/\\/"), b"//");
    }
}
