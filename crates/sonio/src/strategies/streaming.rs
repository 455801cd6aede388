use std::time::Duration;

use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use futures::StreamExt;
use reqwest::Client;
use tracing::debug;

use crate::resolver::{FormatResolver, IOS, best_audio};
use crate::strategy::{Acquired, Strategy};
use crate::StrategyError;

/// Resolve through an independent client profile and stream the payload
/// chunk by chunk, aborting as soon as the connection stalls. Slower than
/// the direct fetch but survives servers that throttle large single reads.
pub struct StreamingChunkStrategy {
    http: Client,
    resolver: FormatResolver,
    min_size: usize,
    stall_timeout: Duration,
}

impl StreamingChunkStrategy {
    pub fn new(http: Client, min_size: usize, stall_timeout: Duration) -> Self {
        Self {
            resolver: FormatResolver::new(http.clone()),
            http,
            min_size,
            stall_timeout,
        }
    }
}

#[async_trait]
impl Strategy for StreamingChunkStrategy {
    fn name(&self) -> &'static str {
        "streaming-chunk"
    }

    async fn attempt(&self, content_id: &str) -> Result<Acquired, StrategyError> {
        let formats = self.resolver.resolve(content_id, IOS).await?;
        let format = best_audio(&formats)
            .ok_or_else(|| StrategyError::NoFormat("no audio formats".into()))?;

        let response = self.http.get(&format.url).send().await?;
        if !response.status().is_success() {
            return Err(StrategyError::StatusCode(response.status()));
        }

        let mut buffer = BytesMut::with_capacity(
            format
                .content_length
                .map(|l| l as usize)
                .unwrap_or(256 * 1024),
        );
        let mut stream = response.bytes_stream();

        // Pull chunks until the body ends; a quiet connection is aborted
        // after the stall window instead of waiting out the full timeout
        loop {
            match tokio::time::timeout(self.stall_timeout, stream.next()).await {
                Ok(Some(Ok(chunk))) => buffer.put(chunk),
                Ok(Some(Err(e))) => return Err(StrategyError::Http(e)),
                Ok(None) => break,
                Err(_) => return Err(StrategyError::Stalled(self.stall_timeout)),
            }
        }

        debug!(
            content_id = content_id,
            itag = format.itag,
            size = buffer.len(),
            "Streamed format to completion"
        );

        if buffer.len() < self.min_size {
            return Err(StrategyError::TooSmall {
                size: buffer.len(),
                floor: self.min_size,
            });
        }

        Ok(Acquired {
            bytes: buffer.freeze(),
            mime_type: format.mime_type.clone(),
            direct_url: Some(format.url.clone()),
        })
    }
}
