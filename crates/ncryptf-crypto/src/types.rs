/// Envelope wire format version.
///
/// Version 1: raw box ciphertext, nonce and signature travel out of band.
/// Version 2: [magic:4][nonce:24][sender public key:32][box ciphertext]
///            [signature public key:32][signature:64][checksum:64]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    V1,
    V2,
}

impl Version {
    /// Numeric form used in headers and JSON (`"v": 2`).
    pub fn as_u8(self) -> u8 {
        match self {
            Version::V1 => 1,
            Version::V2 => 2,
        }
    }
}

/// Leading bytes of every version 2 envelope.
pub const VERSION_2_HEADER: [u8; 4] = [0xDE, 0x25, 0x90, 0x02];

/// X25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// X25519 secret key length in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Ed25519 secret key length in bytes (seed || public key).
pub const SIGNING_SECRET_KEY_LENGTH: usize = 64;

/// Ed25519 public key length in bytes.
pub const SIGNING_PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// XSalsa20 nonce length in bytes.
pub const NONCE_LENGTH: usize = 24;

/// Poly1305 tag length in bytes, i.e. the smallest possible box ciphertext.
pub const MAC_LENGTH: usize = 16;

/// Keyed BLAKE2b checksum length in bytes.
pub const CHECKSUM_LENGTH: usize = 64;

/// Smallest structurally valid version 2 envelope:
/// 4 + 24 + 32 + 16 + 32 + 64 + 64 = 236 bytes.
pub const MIN_V2_ENVELOPE_LENGTH: usize = VERSION_2_HEADER.len()
    + NONCE_LENGTH
    + PUBLIC_KEY_LENGTH
    + MAC_LENGTH
    + SIGNING_PUBLIC_KEY_LENGTH
    + SIGNATURE_LENGTH
    + CHECKSUM_LENGTH;
