//! `data:` URL encoding for image payloads.
//!
//! Gallery entries are persisted as base64 `data:` URLs so the store stays
//! a flat map of strings.

use base64::Engine;

use crate::error::{Result, SafariError};

const DATA_URL_PREFIX: &str = "data:";

/// Encode bytes as a base64 `data:` URL with the given media type.
pub fn encode(media_type: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("{DATA_URL_PREFIX}{media_type};base64,{payload}")
}

/// Decode a base64 `data:` URL into its media type and bytes.
///
/// Only base64 payloads are accepted; image payloads are never
/// percent-encoded.
pub fn decode(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url.strip_prefix(DATA_URL_PREFIX).ok_or_else(|| invalid("missing 'data:' prefix"))?;
    let (metadata, data) = rest.split_once(',').ok_or_else(|| invalid("missing comma"))?;

    let mut parts = metadata.split(';');
    let media_type = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(invalid("payload is not base64"));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| invalid(&format!("bad base64 payload: {}", e)))?;

    Ok((media_type, bytes))
}

fn invalid(reason: &str) -> SafariError {
    SafariError::Parse {
        message: format!("Invalid data URL: {}", reason),
        help: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg() {
        assert_eq!(encode("image/jpeg", b"abc"), "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn test_decode_roundtrip() {
        let url = encode("image/png", &[0, 1, 2, 254, 255]);
        let (media_type, bytes) = decode(&url).unwrap();
        assert_eq!(media_type, "image/png");
        assert_eq!(bytes, vec![0, 1, 2, 254, 255]);
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        let err = decode("data:text/plain,hello").unwrap_err();
        assert!(err.to_string().contains("not base64"));
    }

    #[test]
    fn test_decode_rejects_plain_url() {
        assert!(decode("https://example.com/a.png").is_err());
    }
}
