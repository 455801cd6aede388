use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::strategy::{Acquired, Strategy};
use crate::StrategyError;

/// Last-resort fallback through a third-party extraction mirror (a
/// Piped-compatible `/streams/{id}` API). Only registered when an
/// instance URL is configured; public instances come and go, so this
/// carries the weakest prior.
pub struct MirrorApiStrategy {
    http: Client,
    base_url: String,
    min_size: usize,
}

impl MirrorApiStrategy {
    pub fn new(http: Client, base_url: impl Into<String>, min_size: usize) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            min_size,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MirrorStreams {
    audio_streams: Option<Vec<MirrorStream>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MirrorStream {
    url: Option<String>,
    mime_type: Option<String>,
    bitrate: Option<u64>,
}

/// Pick the best advertised audio stream out of a mirror response body
fn parse_mirror_response(body: &[u8]) -> Result<(String, String), StrategyError> {
    let streams: MirrorStreams =
        serde_json::from_slice(body).map_err(|e| StrategyError::Parse(e.to_string()))?;

    streams
        .audio_streams
        .into_iter()
        .flatten()
        .filter_map(|s| {
            let url = s.url?;
            let mime = s.mime_type?;
            Some((url, mime, s.bitrate.unwrap_or(0)))
        })
        .max_by_key(|(_, _, bitrate)| *bitrate)
        .map(|(url, mime, _)| (url, mime))
        .ok_or_else(|| StrategyError::NoFormat("mirror advertised no audio streams".into()))
}

#[async_trait]
impl Strategy for MirrorApiStrategy {
    fn name(&self) -> &'static str {
        "mirror-api"
    }

    fn prior(&self) -> f64 {
        0.3
    }

    async fn attempt(&self, content_id: &str) -> Result<Acquired, StrategyError> {
        let endpoint = format!(
            "{}/streams/{}",
            self.base_url.trim_end_matches('/'),
            content_id
        );

        let response = self.http.get(&endpoint).send().await?;
        if !response.status().is_success() {
            return Err(StrategyError::StatusCode(response.status()));
        }

        let body = response.bytes().await?;
        let (url, mime_type) = parse_mirror_response(&body)?;

        debug!(
            content_id = content_id,
            mime_type = %mime_type,
            "Mirror resolved an audio stream"
        );

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(StrategyError::StatusCode(response.status()));
        }

        let bytes = response.bytes().await?;
        if bytes.len() < self.min_size {
            return Err(StrategyError::TooSmall {
                size: bytes.len(),
                floor: self.min_size,
            });
        }

        Ok(Acquired {
            bytes,
            mime_type: mime_type.split(';').next().unwrap_or(&mime_type).trim().to_string(),
            direct_url: Some(url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_highest_bitrate_stream() {
        let body = r#"{
            "audioStreams": [
                {"url": "https://m/low", "mimeType": "audio/webm", "bitrate": 64000},
                {"url": "https://m/high", "mimeType": "audio/mp4", "bitrate": 128000},
                {"url": null, "mimeType": "audio/mp4", "bitrate": 256000}
            ]
        }"#;

        let (url, mime) = parse_mirror_response(body.as_bytes()).unwrap();
        assert_eq!(url, "https://m/high");
        assert_eq!(mime, "audio/mp4");
    }

    #[test]
    fn empty_stream_list_is_no_format() {
        let body = r#"{"audioStreams": []}"#;
        assert!(matches!(
            parse_mirror_response(body.as_bytes()),
            Err(StrategyError::NoFormat(_))
        ));
    }

    #[test]
    fn non_json_body_is_a_parse_error() {
        assert!(matches!(
            parse_mirror_response(b"gateway timeout"),
            Err(StrategyError::Parse(_))
        ));
    }
}
