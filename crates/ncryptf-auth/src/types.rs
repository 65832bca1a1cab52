/// HKDF info string for the per-request HMAC key.
pub const AUTH_INFO: &[u8] = b"HMAC|AuthenticationKey";

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 32;

/// Initial key material length in bytes.
pub const IKM_LENGTH: usize = 32;

/// HKDF-SHA256 output length in bytes.
pub const AUTH_KEY_LENGTH: usize = 32;

/// HMAC-SHA256 output length in bytes.
pub const HMAC_LENGTH: usize = 32;

/// Seconds a request date may differ from the verifier's clock.
pub const DEFAULT_DRIFT_ALLOWANCE: u64 = 90;

/// Scheme prefix of the `Authorization` header value.
pub const HEADER_PREFIX: &str = "HMAC ";

/// Conventional name of the companion date header.
pub const DATE_HEADER: &str = "X-Date";
