use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

/// Parse "Name: Value" header arguments into a HeaderMap, skipping any
/// that do not parse
pub fn parse_headers(raw: &[String]) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for entry in raw {
        let Some((name, value)) = entry.split_once(':') else {
            warn!(header = %entry, "Ignoring malformed header (expected 'Name: Value')");
            continue;
        };

        match (
            name.trim().parse::<HeaderName>(),
            HeaderValue::from_str(value.trim()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => {
                warn!(header = %entry, "Ignoring invalid header");
            }
        }
    }

    headers
}

/// Whether a string has the shape of a content id: exactly 11 characters
/// from the URL-safe id alphabet
pub fn is_valid_content_id(id: &str) -> bool {
    id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Map a MIME type to the file extension acquired audio is saved with
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/mp4" => "m4a",
        "audio/webm" => "webm",
        "audio/mpeg" => "mp3",
        "audio/ogg" => "ogg",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&[
            "X-Api-Key: secret".to_string(),
            "broken header".to_string(),
            "Referer: https://example.com".to_string(),
        ]);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-Api-Key").unwrap(), "secret");
        assert_eq!(headers.get("Referer").unwrap(), "https://example.com");
    }

    #[test]
    fn test_is_valid_content_id() {
        assert!(is_valid_content_id("dQw4w9WgXcQ"));
        assert!(is_valid_content_id("a-b_c123XYZ"));
        assert!(!is_valid_content_id("too-short"));
        assert!(!is_valid_content_id("way-too-long-for-an-id"));
        assert!(!is_valid_content_id("bad/chars!!"));
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("audio/mp4"), "m4a");
        assert_eq!(extension_for("audio/webm"), "webm");
        assert_eq!(extension_for("text/html"), "bin");
    }
}
