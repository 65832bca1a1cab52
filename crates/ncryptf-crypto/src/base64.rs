use base64ct::{Base64, Encoding};

/// Standard (padded) Base64 encode.
pub fn base64_encode(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Standard (padded) Base64 decode.
pub fn base64_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64::decode_vec(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"Hello, World!";
        let encoded = base64_encode(data);
        let decoded = base64_decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn keeps_padding() {
        assert_eq!(base64_encode(b"ab"), "YWI=");
    }

    #[test]
    fn standard_alphabet() {
        // Bytes that produce + and / in the standard alphabet
        let encoded = base64_encode(&[0xfb, 0xff, 0xfe]);
        assert_eq!(encoded, "+//+");
    }

    #[test]
    fn rejects_url_safe_alphabet() {
        assert!(base64_decode("-__-").is_err());
    }

    #[test]
    fn empty_input() {
        assert_eq!(base64_encode(b""), "");
        assert_eq!(base64_decode("").unwrap(), Vec::<u8>::new());
    }
}
