//! # Format Resolution
//!
//! Resolves a content id into concrete, directly fetchable audio format
//! URLs via the upstream player metadata endpoint. Different client
//! profiles get served different format sets (and fail independently), so
//! each strategy resolves with its own profile.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::StrategyError;

const PLAYER_ENDPOINT: &str = "https://www.youtube.com/youtubei/v1/player?prettyPrint=false";

/// An upstream client identity to resolve formats as
#[derive(Debug, Clone, Copy)]
pub struct ClientProfile {
    pub client_name: &'static str,
    pub client_version: &'static str,
}

/// Android client: returns plain format URLs without signature ciphering
pub const ANDROID: ClientProfile = ClientProfile {
    client_name: "ANDROID",
    client_version: "20.10.38",
};

/// iOS client: independent format pool, used by the streaming strategy
pub const IOS: ClientProfile = ClientProfile {
    client_name: "IOS",
    client_version: "19.29.1",
};

/// A single playable audio format advertised by the player endpoint
#[derive(Debug, Clone)]
pub struct AudioFormat {
    pub itag: u32,
    pub url: String,
    /// MIME type with codec parameters stripped, e.g. `audio/mp4`
    pub mime_type: String,
    pub bitrate: u64,
    pub content_length: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    streaming_data: Option<StreamingData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamingData {
    adaptive_formats: Option<Vec<RawFormat>>,
    formats: Option<Vec<RawFormat>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFormat {
    itag: Option<u32>,
    url: Option<String>,
    mime_type: Option<String>,
    bitrate: Option<u64>,
    content_length: Option<String>,
}

/// Resolves playable audio formats through the player endpoint
pub struct FormatResolver {
    http: Client,
}

impl FormatResolver {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Ask the player endpoint for the audio formats of `content_id`,
    /// identifying as the given client profile
    pub async fn resolve(
        &self,
        content_id: &str,
        profile: ClientProfile,
    ) -> Result<Vec<AudioFormat>, StrategyError> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": profile.client_name,
                    "clientVersion": profile.client_version,
                    "hl": "en",
                }
            },
            "videoId": content_id,
            "contentCheckOk": true,
            "racyCheckOk": true,
        });

        let response = self.http.post(PLAYER_ENDPOINT).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(StrategyError::StatusCode(response.status()));
        }

        let raw = response.bytes().await?;
        let formats = parse_player_response(&raw)?;

        debug!(
            content_id = content_id,
            client = profile.client_name,
            formats = formats.len(),
            "Resolved audio formats"
        );

        Ok(formats)
    }
}

/// Parse a player response body into its audio-only formats
pub(crate) fn parse_player_response(body: &[u8]) -> Result<Vec<AudioFormat>, StrategyError> {
    let response: PlayerResponse = serde_json::from_slice(body)
        .map_err(|e| StrategyError::Parse(e.to_string()))?;

    if let Some(status) = &response.playability_status {
        match status.status.as_deref() {
            Some("OK") | None => {}
            Some(other) => {
                let reason = status.reason.as_deref().unwrap_or("no reason given");
                return Err(StrategyError::NoFormat(format!("{other}: {reason}")));
            }
        }
    }

    let streaming = response
        .streaming_data
        .ok_or_else(|| StrategyError::NoFormat("missing streaming data".into()))?;

    let raw = streaming
        .adaptive_formats
        .into_iter()
        .flatten()
        .chain(streaming.formats.into_iter().flatten());

    let formats: Vec<AudioFormat> = raw
        .filter_map(|f| {
            let mime = f.mime_type?;
            if !mime.starts_with("audio/") {
                return None;
            }
            Some(AudioFormat {
                itag: f.itag?,
                // Formats without a plain URL need signature deciphering;
                // those are useless to us, skip them
                url: f.url?,
                mime_type: mime.split(';').next().unwrap_or(&mime).trim().to_string(),
                bitrate: f.bitrate.unwrap_or(0),
                content_length: f.content_length.and_then(|l| l.parse().ok()),
            })
        })
        .collect();

    if formats.is_empty() {
        return Err(StrategyError::NoFormat("no audio formats with direct URLs".into()));
    }

    Ok(formats)
}

/// Pick the highest-bitrate audio format
pub(crate) fn best_audio(formats: &[AudioFormat]) -> Option<&AudioFormat> {
    formats.iter().max_by_key(|f| f.bitrate)
}
