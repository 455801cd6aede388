use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::resolver::{ANDROID, FormatResolver, best_audio};
use crate::strategy::{Acquired, Strategy};
use crate::StrategyError;

/// Resolve a direct media URL through the player endpoint, then fetch the
/// whole payload in one bounded request. Historically the most reliable
/// method, so it carries the strongest prior.
pub struct DirectFormatStrategy {
    http: Client,
    resolver: FormatResolver,
    min_size: usize,
}

impl DirectFormatStrategy {
    pub fn new(http: Client, min_size: usize) -> Self {
        Self {
            resolver: FormatResolver::new(http.clone()),
            http,
            min_size,
        }
    }
}

#[async_trait]
impl Strategy for DirectFormatStrategy {
    fn name(&self) -> &'static str {
        "direct-format"
    }

    fn prior(&self) -> f64 {
        0.7
    }

    async fn attempt(&self, content_id: &str) -> Result<Acquired, StrategyError> {
        let formats = self.resolver.resolve(content_id, ANDROID).await?;
        let format = best_audio(&formats)
            .ok_or_else(|| StrategyError::NoFormat("no audio formats".into()))?;

        // The advertised length catches dead formats before we spend a
        // request on them
        if let Some(length) = format.content_length {
            if (length as usize) < self.min_size {
                return Err(StrategyError::TooSmall {
                    size: length as usize,
                    floor: self.min_size,
                });
            }
        }

        debug!(
            content_id = content_id,
            itag = format.itag,
            mime_type = %format.mime_type,
            "Fetching resolved format"
        );

        let response = self.http.get(&format.url).send().await?;
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
            mime_type: format.mime_type.clone(),
            direct_url: Some(format.url.clone()),
        })
    }
}
