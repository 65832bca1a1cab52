//! `Authorization` header construction, verification and parsing.
//!
//! The HMAC key is HKDF-SHA256(token ikm, salt, "HMAC|AuthenticationKey"),
//! rendered as lowercase hex before it is handed to HMAC-SHA256. Servers in
//! the wild key their HMAC that way, so the hex step is part of the format.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use ncryptf_crypto::{base64_decode, base64_encode, Version};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::date::{format_rfc1123, parse_rfc1123};
use crate::error::AuthError;
use crate::hkdf::derive_auth_key;
use crate::signature;
use crate::token::Token;
use crate::types::{HEADER_PREFIX, HMAC_LENGTH, SALT_LENGTH};

type HmacSha256 = Hmac<Sha256>;

/// A signed request authorization.
#[derive(Debug, Clone)]
pub struct Authorization {
    access_token: String,
    salt: [u8; SALT_LENGTH],
    date: DateTime<Utc>,
    signature: String,
    hmac: [u8; HMAC_LENGTH],
    version: Version,
}

/// JSON body of a v2 header. Field order is part of the wire format.
#[derive(Serialize)]
struct HeaderJson<'a> {
    access_token: &'a str,
    date: &'a str,
    hmac: &'a str,
    salt: &'a str,
    v: u8,
}

#[derive(Deserialize)]
struct ParsedHeaderJson {
    access_token: String,
    date: String,
    hmac: String,
    salt: String,
    v: u8,
}

impl Authorization {
    /// Sign one request.
    ///
    /// # Arguments
    /// * `method` - HTTP method, any case
    /// * `uri` - Request URI including query string
    /// * `token` - Session token supplying the access token and ikm
    /// * `date` - Request date, already adjusted for any known server offset
    /// * `payload` - Raw request body
    /// * `version` - Signature and header version
    /// * `salt` - 32-byte salt, or `None` for a fresh random one
    pub fn new(
        method: &str,
        uri: &str,
        token: &Token,
        date: DateTime<Utc>,
        payload: &[u8],
        version: Version,
        salt: Option<&[u8]>,
    ) -> Result<Self, AuthError> {
        let salt = match salt {
            Some(s) => <[u8; SALT_LENGTH]>::try_from(s).map_err(|_| {
                AuthError::InvalidArgument(format!(
                    "Salt must be {} bytes, got {}",
                    SALT_LENGTH,
                    s.len()
                ))
            })?,
            None => random_salt()?,
        };

        let signature = signature::derive(method, uri, &salt, &date, payload, version)?;
        let hmac = compute_hmac(token.ikm(), &salt, &signature)?;

        tracing::debug!(
            version = version.as_u8(),
            method = %method.to_uppercase(),
            uri,
            "built request authorization"
        );

        Ok(Self {
            access_token: token.access_token.clone(),
            salt,
            date,
            signature,
            hmac,
            version,
        })
    }

    /// Check `hmac` against `auth`, rejecting requests whose date has
    /// drifted `drift_allowance` seconds or more from now.
    pub fn verify(hmac: &[u8], auth: &Authorization, drift_allowance: u64) -> bool {
        Self::verify_at(hmac, auth, drift_allowance, Utc::now())
    }

    /// [`Authorization::verify`] against an explicit clock.
    pub fn verify_at(
        hmac: &[u8],
        auth: &Authorization,
        drift_allowance: u64,
        now: DateTime<Utc>,
    ) -> bool {
        let drift = (now.timestamp() - auth.date.timestamp()).unsigned_abs();
        if drift >= drift_allowance {
            tracing::warn!(drift, drift_allowance, "authorization date outside drift allowance");
            return false;
        }

        hmac.ct_eq(&auth.hmac[..]).into()
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// RFC 1123 date, suitable for the `X-Date` header.
    pub fn date_string(&self) -> String {
        format_rfc1123(&self.date)
    }

    pub fn hmac(&self) -> &[u8; HMAC_LENGTH] {
        &self.hmac
    }

    pub fn encoded_hmac(&self) -> String {
        base64_encode(&self.hmac)
    }

    pub fn salt(&self) -> &[u8; SALT_LENGTH] {
        &self.salt
    }

    pub fn encoded_salt(&self) -> String {
        base64_encode(&self.salt)
    }

    pub fn signature_string(&self) -> &str {
        &self.signature
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Value for the `Authorization` header, including the `HMAC ` scheme.
    pub fn header(&self) -> Result<String, AuthError> {
        let hmac = self.encoded_hmac();
        let salt = self.encoded_salt();

        match self.version {
            Version::V1 => Ok(format!(
                "{}{},{},{}",
                HEADER_PREFIX, self.access_token, hmac, salt
            )),
            Version::V2 => {
                let date = self.date_string();
                let json = serde_json::to_string(&HeaderJson {
                    access_token: &self.access_token,
                    date: &date,
                    hmac: &hmac,
                    salt: &salt,
                    v: Version::V2.as_u8(),
                })?
                .replace('/', "\\/");
                Ok(format!("{}{}", HEADER_PREFIX, base64_encode(json.as_bytes())))
            }
        }
    }
}

/// The fields a server recovers from an `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuthorization {
    pub access_token: String,
    pub hmac: [u8; HMAC_LENGTH],
    pub salt: [u8; SALT_LENGTH],
    /// Present for v2; v1 carries the date in `X-Date`.
    pub date: Option<DateTime<Utc>>,
    pub version: Version,
}

impl ParsedAuthorization {
    /// Parse either header format. The `HMAC ` scheme prefix is required.
    pub fn parse(header: &str) -> Result<Self, AuthError> {
        let value = header
            .trim()
            .strip_prefix(HEADER_PREFIX)
            .ok_or_else(|| AuthError::MalformedHeader("missing HMAC scheme".into()))?
            .trim();

        if value.contains(',') {
            Self::parse_v1(value)
        } else {
            Self::parse_v2(value)
        }
    }

    fn parse_v1(value: &str) -> Result<Self, AuthError> {
        let parts: Vec<&str> = value.split(',').collect();
        let [access_token, hmac, salt] = parts.as_slice() else {
            return Err(AuthError::MalformedHeader(format!(
                "expected 3 comma-separated fields, got {}",
                parts.len()
            )));
        };
        if access_token.is_empty() {
            return Err(AuthError::MalformedHeader("empty access token".into()));
        }

        Ok(Self {
            access_token: access_token.to_string(),
            hmac: decode_field("hmac", hmac)?,
            salt: decode_field("salt", salt)?,
            date: None,
            version: Version::V1,
        })
    }

    fn parse_v2(value: &str) -> Result<Self, AuthError> {
        let raw = base64_decode(value)
            .map_err(|e| AuthError::MalformedHeader(format!("header is not base64: {}", e)))?;
        let json: ParsedHeaderJson = serde_json::from_slice(&raw)
            .map_err(|e| AuthError::MalformedHeader(format!("header is not valid JSON: {}", e)))?;

        if json.v != Version::V2.as_u8() {
            return Err(AuthError::MalformedHeader(format!(
                "unsupported header version {}",
                json.v
            )));
        }
        let date = parse_rfc1123(&json.date)
            .map_err(|_| AuthError::MalformedHeader(format!("bad date {:?}", json.date)))?;

        Ok(Self {
            hmac: decode_field("hmac", &json.hmac)?,
            salt: decode_field("salt", &json.salt)?,
            access_token: json.access_token,
            date: Some(date),
            version: Version::V2,
        })
    }

    /// Recompute the authorization a client holding `token` would have sent.
    ///
    /// `fallback_date` is used when the header itself carries no date (v1),
    /// normally the parsed `X-Date` header.
    pub fn rebuild(
        &self,
        method: &str,
        uri: &str,
        token: &Token,
        payload: &[u8],
        fallback_date: Option<DateTime<Utc>>,
    ) -> Result<Authorization, AuthError> {
        let date = self.date.or(fallback_date).ok_or_else(|| {
            AuthError::InvalidArgument("no request date available for verification".into())
        })?;
        Authorization::new(
            method,
            uri,
            token,
            date,
            payload,
            self.version,
            Some(&self.salt),
        )
    }
}

fn compute_hmac(
    ikm: &[u8],
    salt: &[u8],
    signature: &str,
) -> Result<[u8; HMAC_LENGTH], AuthError> {
    let key = derive_auth_key(ikm, salt)?;
    let hex_key = Zeroizing::new(hex::encode(*key));

    let mut mac = <HmacSha256 as Mac>::new_from_slice(hex_key.as_bytes())
        .map_err(|e| AuthError::KeyDerivationFailed(format!("HMAC key rejected: {}", e)))?;
    mac.update(signature.as_bytes());

    let mut out = [0u8; HMAC_LENGTH];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn random_salt() -> Result<[u8; SALT_LENGTH], AuthError> {
    let mut salt = [0u8; SALT_LENGTH];
    getrandom::getrandom(&mut salt).map_err(|e| AuthError::RngFailed(e.to_string()))?;
    Ok(salt)
}

fn decode_field<const N: usize>(what: &str, encoded: &str) -> Result<[u8; N], AuthError> {
    let bytes = base64_decode(encoded)
        .map_err(|e| AuthError::MalformedHeader(format!("{} is not base64: {}", what, e)))?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        AuthError::MalformedHeader(format!("{} must be {} bytes, got {}", what, N, bytes.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Token {
        Token::new("access/token", "refresh", &[7u8; 32], &[8u8; 64], i64::MAX).unwrap()
    }

    fn date() -> DateTime<Utc> {
        DateTime::from_timestamp(1533310068, 0).unwrap()
    }

    fn build(version: Version, salt: Option<&[u8]>) -> Authorization {
        Authorization::new(
            "post",
            "/api/v1/test",
            &token(),
            date(),
            b"{\"foo\":\"bar\"}",
            version,
            salt,
        )
        .unwrap()
    }

    #[test]
    fn random_salt_differs_per_call() {
        let a = build(Version::V2, None);
        let b = build(Version::V2, None);
        assert_ne!(a.salt(), b.salt());
        assert_ne!(a.hmac(), b.hmac());
    }

    #[test]
    fn fixed_salt_is_deterministic() {
        let a = build(Version::V2, Some(&[3u8; 32][..]));
        let b = build(Version::V2, Some(&[3u8; 32][..]));
        assert_eq!(a.hmac(), b.hmac());
        assert_eq!(a.header().unwrap(), b.header().unwrap());
    }

    #[test]
    fn short_salt_rejected() {
        let err = Authorization::new(
            "GET",
            "/",
            &token(),
            date(),
            b"",
            Version::V2,
            Some(&[0u8; 16][..]),
        )
        .unwrap_err();
        assert!(matches!(err, AuthError::InvalidArgument(_)));
    }

    #[test]
    fn signature_string_uppercases_method() {
        let auth = build(Version::V1, Some(&[3u8; 32][..]));
        assert!(auth.signature_string().contains("\nPOST+/api/v1/test\n"));
    }

    #[test]
    fn verify_accepts_within_drift() {
        let auth = build(Version::V2, Some(&[3u8; 32][..]));
        let now = date() + chrono::Duration::seconds(89);
        assert!(Authorization::verify_at(auth.hmac(), &auth, 90, now));
    }

    #[test]
    fn verify_rejects_at_drift_boundary() {
        let auth = build(Version::V2, Some(&[3u8; 32][..]));
        let now = date() + chrono::Duration::seconds(90);
        assert!(!Authorization::verify_at(auth.hmac(), &auth, 90, now));
        let past = date() - chrono::Duration::seconds(90);
        assert!(!Authorization::verify_at(auth.hmac(), &auth, 90, past));
    }

    #[test]
    fn verify_rejects_wrong_hmac() {
        let auth = build(Version::V2, Some(&[3u8; 32][..]));
        let mut hmac = *auth.hmac();
        hmac[0] ^= 1;
        assert!(!Authorization::verify_at(&hmac, &auth, 90, date()));
        assert!(!Authorization::verify_at(&hmac[..16], &auth, 90, date()));
    }

    #[test]
    fn verify_uses_wall_clock() {
        let auth = build(Version::V2, Some(&[3u8; 32][..]));
        assert!(!Authorization::verify(auth.hmac(), &auth, 90));

        let fresh = Authorization::new(
            "GET",
            "/",
            &token(),
            Utc::now(),
            b"",
            Version::V2,
            None,
        )
        .unwrap();
        assert!(Authorization::verify(fresh.hmac(), &fresh, 90));
    }

    #[test]
    fn v1_header_shape() {
        let auth = build(Version::V1, Some(&[3u8; 32][..]));
        let header = auth.header().unwrap();
        assert_eq!(
            header,
            format!(
                "HMAC access/token,{},{}",
                auth.encoded_hmac(),
                auth.encoded_salt()
            )
        );
    }

    #[test]
    fn v2_header_escapes_slashes() {
        let auth = build(Version::V2, Some(&[3u8; 32][..]));
        let header = auth.header().unwrap();
        let json = base64_decode(header.strip_prefix("HMAC ").unwrap()).unwrap();
        let json = String::from_utf8(json).unwrap();
        assert!(json.starts_with("{\"access_token\":\"access\\/token\",\"date\":"));
        assert!(json.ends_with(",\"v\":2}"));
        assert!(!json.replace("\\/", "").contains('/'));
    }

    #[test]
    fn parse_v2_round_trip() {
        let auth = build(Version::V2, Some(&[3u8; 32][..]));
        let parsed = ParsedAuthorization::parse(&auth.header().unwrap()).unwrap();
        assert_eq!(parsed.access_token, "access/token");
        assert_eq!(&parsed.hmac, auth.hmac());
        assert_eq!(&parsed.salt, auth.salt());
        assert_eq!(parsed.date, Some(date()));
        assert_eq!(parsed.version, Version::V2);
    }

    #[test]
    fn parse_v1_then_rebuild_verifies() {
        let auth = build(Version::V1, Some(&[9u8; 32][..]));
        let parsed = ParsedAuthorization::parse(&auth.header().unwrap()).unwrap();
        assert_eq!(parsed.version, Version::V1);
        assert_eq!(parsed.date, None);

        let rebuilt = parsed
            .rebuild(
                "POST",
                "/api/v1/test",
                &token(),
                b"{\"foo\":\"bar\"}",
                Some(date()),
            )
            .unwrap();
        assert!(Authorization::verify_at(&parsed.hmac, &rebuilt, 90, date()));
    }

    #[test]
    fn rebuild_without_any_date_fails() {
        let auth = build(Version::V1, Some(&[9u8; 32][..]));
        let parsed = ParsedAuthorization::parse(&auth.header().unwrap()).unwrap();
        let err = parsed
            .rebuild("POST", "/", &token(), b"", None)
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidArgument(_)));
    }

    #[test]
    fn parse_rejects_malformed() {
        for header in [
            "Bearer abc",
            "HMAC a,b",
            "HMAC ,AAAA,AAAA",
            "HMAC tok,not base64!,AAAA",
            "HMAC tok,AAAA,AAAA",
            "HMAC not-base64!!",
            "HMAC e30=",
        ] {
            let err = ParsedAuthorization::parse(header).unwrap_err();
            assert!(
                matches!(err, AuthError::MalformedHeader(_)),
                "{header}: {err:?}"
            );
        }
    }
}
