//! Data URL helpers.
//!
//! Images move through the workflows as `data:<mime>;base64,...` strings,
//! the same currency the canvas assets use.

use crate::ServiceError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Wrap an already-encoded base64 payload in a data URL.
pub fn to_data_url(base64: &str, mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64)
}

/// Encode raw bytes into a data URL.
pub fn encode(bytes: &[u8], mime_type: &str) -> String {
    to_data_url(&STANDARD.encode(bytes), mime_type)
}

/// Split a data URL into its mime type and decoded bytes.
pub fn parse(data_url: &str) -> Result<(String, Vec<u8>), ServiceError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(ServiceError::InvalidDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(ServiceError::InvalidDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(ServiceError::InvalidDataUrl)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| ServiceError::InvalidDataUrl)?;
    Ok((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_and_parse_round_trip() {
        let bytes = b"\x89PNG\r\n\x1a\n";
        let url = encode(bytes, "image/png");
        assert!(url.starts_with("data:image/png;base64,"));

        let (mime, decoded) = parse(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn parse_rejects_non_data_urls() {
        assert!(matches!(
            parse("https://example.com/cat.png"),
            Err(ServiceError::InvalidDataUrl)
        ));
    }

    #[test]
    fn parse_rejects_unencoded_payloads() {
        assert!(matches!(
            parse("data:text/plain,hello"),
            Err(ServiceError::InvalidDataUrl)
        ));
    }

    #[test]
    fn parse_rejects_bad_base64() {
        assert!(matches!(
            parse("data:image/png;base64,@@@"),
            Err(ServiceError::InvalidDataUrl)
        ));
    }
}
