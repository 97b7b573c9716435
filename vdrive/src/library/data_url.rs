//! Helpers for `data:` URLs, the form binary uploads are kept in.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

pub fn is_data_url(data: &str) -> bool {
    data.starts_with(PREFIX)
}

/// Byte size of a payload.
///
/// For base64 data URLs this is derived from the encoded length,
/// `len * 3 / 4` minus the `=` padding, without decoding. Other data URLs and
/// plain strings count their UTF-8 bytes.
pub fn payload_size(data: &str) -> u64 {
    let Some(rest) = data.strip_prefix(PREFIX) else {
        return data.len() as u64;
    };
    let Some((header, body)) = rest.split_once(',') else {
        return data.len() as u64;
    };

    if header.ends_with(BASE64_MARKER) {
        let padding = body.bytes().rev().take_while(|b| *b == b'=').count().min(2);
        ((body.len() * 3 / 4).saturating_sub(padding)) as u64
    } else {
        body.len() as u64
    }
}

pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("{PREFIX}{mime_type}{BASE64_MARKER},{}", STANDARD.encode(bytes))
}

/// MIME type declared in the header, if any.
pub fn mime_type(data: &str) -> Option<&str> {
    let (header, _) = data.strip_prefix(PREFIX)?.split_once(',')?;
    let mime = header.split(';').next().unwrap_or_default();
    if mime.is_empty() { None } else { Some(mime) }
}

/// Decodes the payload of a data URL into raw bytes.
pub fn decode(data: &str) -> Option<Vec<u8>> {
    let (header, body) = data.strip_prefix(PREFIX)?.split_once(',')?;
    if header.ends_with(BASE64_MARKER) {
        STANDARD.decode(body).ok()
    } else {
        Some(body.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_size_matches_decoded_length() {
        for len in 0..10usize {
            let bytes: Vec<u8> = (0..len as u8).collect();
            let url = encode("image/png", &bytes);
            assert_eq!(payload_size(&url), len as u64, "length {len}");
            assert_eq!(decode(&url).unwrap(), bytes);
        }
    }

    #[test]
    fn test_payload_size_plain_text() {
        assert_eq!(payload_size("hello"), 5);
        assert_eq!(payload_size("ü"), 2);
        assert_eq!(payload_size(&"x".repeat(3000)), 3000);
        assert_eq!(payload_size("data:text/plain,hi%20there"), 10);
        assert_eq!(payload_size("data:broken"), 11);
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type("data:image/jpeg;base64,AAAA"), Some("image/jpeg"));
        assert_eq!(mime_type("data:,plain"), None);
        assert_eq!(mime_type("not a url"), None);
        assert!(is_data_url("data:,x"));
        assert!(!is_data_url("x"));
    }
}
