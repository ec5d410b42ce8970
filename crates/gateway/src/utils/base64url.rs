//! Base64URL decoding per RFC 4648
//!
//! Token segments are unpadded, but issuers that pad them with `=` are
//! accepted as well.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode Base64URL string to bytes, `None` when invalid or larger than `max_size`
pub(crate) fn decode_bytes(input: &str, max_size: usize) -> Option<Vec<u8>> {
    // Every 4 input characters decode to at most 3 bytes
    if input.len() / 4 * 3 > max_size + 3 {
        return None;
    }

    let bytes = URL_SAFE_LENIENT.decode(input).ok()?;

    (bytes.len() <= max_size).then_some(bytes)
}

/// Decode Base64URL string to UTF-8 string with size limit
pub(crate) fn decode_string(input: &str, max_size: usize) -> Option<String> {
    decode_bytes(input, max_size).and_then(|bytes| String::from_utf8(bytes).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_invalid() {
        assert!(decode_bytes("!!!", 1000).is_none());
        assert!(decode_bytes("a+b/", 1000).is_none()); // standard alphabet
    }

    #[test]
    fn test_decode_valid() {
        assert_eq!(decode_bytes("SGVsbG8", 1000).unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_padded() {
        assert_eq!(decode_bytes("SGVsbG8=", 1000).unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_with_limit() {
        assert_eq!(decode_bytes("SGVsbG8", 10).unwrap(), b"Hello");
        assert!(decode_bytes("SGVsbG8", 3).is_none());
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode_bytes("", 1000).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_string() {
        assert_eq!(decode_string("SGVsbG8", 10).unwrap(), "Hello");
        assert!(decode_string("SGVsbG8", 3).is_none());
        assert!(decode_string("_w", 10).is_none()); // 0xFF is not UTF-8
    }
}
