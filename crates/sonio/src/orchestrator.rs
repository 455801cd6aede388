//! # Acquisition Orchestrator
//!
//! Drives the whole acquisition of one content id: admission control,
//! cached-URL reuse, adaptive strategy ordering, the sequential attempt
//! loop with per-attempt timeouts, and stats/cache bookkeeping. Strategies
//! themselves never touch shared state; everything they learn flows back
//! through this type.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::cache::FormatCache;
use crate::client::create_client;
use crate::error::{AcquisitionError, StrategyError, StrategyFailure};
use crate::strategies::{DirectFormatStrategy, MirrorApiStrategy, StreamingChunkStrategy};
use crate::strategy::Strategy;
use crate::tracker::StrategyPerformanceTracker;
use crate::AcquisitionConfig;

/// Audio content returned from a successful acquisition. The buffer is
/// owned exclusively by the caller.
#[derive(Debug, Clone)]
pub struct AcquisitionResult {
    /// The audio payload; never empty
    pub content: Bytes,
    /// MIME type of the payload, e.g. `audio/mp4`
    pub mime_type: String,
}

impl AcquisitionResult {
    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }
}

/// Orchestrates prioritized, adaptive acquisition attempts for audio
/// content ids. One instance is meant to live for the whole process and
/// be shared across request handlers; all interior state is synchronized.
pub struct AcquisitionOrchestrator {
    client: Client,
    strategies: Vec<Arc<dyn Strategy>>,
    cache: FormatCache,
    tracker: StrategyPerformanceTracker,
    gate: Semaphore,
    config: AcquisitionConfig,
}

impl AcquisitionOrchestrator {
    /// Create an orchestrator with the default strategy set: direct format
    /// fetch, chunked streaming, and (when configured) the extraction
    /// mirror.
    pub fn new(config: AcquisitionConfig) -> Result<Self, AcquisitionError> {
        let client = create_client(&config)?;

        let mut strategies: Vec<Arc<dyn Strategy>> = vec![
            Arc::new(DirectFormatStrategy::new(
                client.clone(),
                config.min_content_size,
            )),
            Arc::new(StreamingChunkStrategy::new(
                client.clone(),
                config.min_content_size,
                config.stall_timeout,
            )),
        ];

        if let Some(mirror) = &config.mirror_api {
            strategies.push(Arc::new(MirrorApiStrategy::new(
                client.clone(),
                mirror.clone(),
                config.min_content_size,
            )));
        }

        Self::assemble(config, client, strategies)
    }

    /// Create an orchestrator over an explicit strategy list. Used by
    /// tests and by embedders that bring their own acquisition methods.
    pub fn with_strategies(
        config: AcquisitionConfig,
        strategies: Vec<Arc<dyn Strategy>>,
    ) -> Result<Self, AcquisitionError> {
        let client = create_client(&config)?;
        Self::assemble(config, client, strategies)
    }

    fn assemble(
        config: AcquisitionConfig,
        client: Client,
        strategies: Vec<Arc<dyn Strategy>>,
    ) -> Result<Self, AcquisitionError> {
        Ok(Self {
            client,
            strategies,
            cache: FormatCache::new(config.cache_ttl, config.cache_capacity),
            tracker: StrategyPerformanceTracker::new(),
            gate: Semaphore::new(config.max_concurrency),
            config,
        })
    }

    /// The shared format cache
    pub fn cache(&self) -> &FormatCache {
        &self.cache
    }

    /// The shared per-strategy performance counters
    pub fn tracker(&self) -> &StrategyPerformanceTracker {
        &self.tracker
    }

    /// Acquire the audio for one content id.
    ///
    /// Tries the cached direct URL first, then each registered strategy in
    /// adaptively chosen order, returning the first success. Fails with
    /// [`AcquisitionError::Exhausted`] only when every attempted strategy
    /// failed, and with [`AcquisitionError::AtCapacity`] when too many
    /// acquisitions are already in flight.
    pub async fn acquire(&self, content_id: &str) -> Result<AcquisitionResult, AcquisitionError> {
        let _permit = self
            .gate
            .try_acquire()
            .map_err(|_| AcquisitionError::AtCapacity)?;

        let deadline = Instant::now() + self.config.overall_deadline;
        let floor = self.config.min_content_size.max(1);

        // A remembered direct URL skips strategy selection entirely; if it
        // has gone stale upstream we drop it and run the normal loop
        if let Some(entry) = self.cache.get(content_id) {
            debug!(content_id = content_id, "Trying cached direct URL");
            match self
                .fetch_direct(&entry.direct_url, self.attempt_budget(deadline), floor)
                .await
            {
                Ok(content) => {
                    info!(
                        content_id = content_id,
                        size = content.len(),
                        "Acquired audio from cached URL"
                    );
                    return Ok(AcquisitionResult {
                        content,
                        mime_type: entry.mime_type,
                    });
                }
                Err(err) => {
                    warn!(
                        content_id = content_id,
                        error = %err,
                        "Cached URL failed, evicting"
                    );
                    self.cache.evict(content_id);
                }
            }
        }

        let priors: Vec<(&'static str, f64)> = self
            .strategies
            .iter()
            .map(|s| (s.name(), s.prior()))
            .collect();
        let order = self.tracker.ordered(&priors);

        let mut attempts = Vec::with_capacity(order.len());

        for index in order {
            let strategy = &self.strategies[index];

            let budget = self.attempt_budget(deadline);
            if budget.is_zero() {
                debug!(
                    content_id = content_id,
                    "Acquisition deadline exhausted before trying every strategy"
                );
                break;
            }

            debug!(
                content_id = content_id,
                strategy = strategy.name(),
                budget_ms = budget.as_millis() as u64,
                "Attempting strategy"
            );

            let started = Instant::now();
            let outcome = tokio::time::timeout(budget, strategy.attempt(content_id)).await;
            let elapsed = started.elapsed();

            let error = match outcome {
                Ok(Ok(acquired)) if acquired.bytes.len() >= floor => {
                    self.tracker.record_success(strategy.name(), elapsed);
                    if let Some(url) = &acquired.direct_url {
                        self.cache.put(content_id, url, &acquired.mime_type);
                    }
                    info!(
                        content_id = content_id,
                        strategy = strategy.name(),
                        size = acquired.bytes.len(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Acquired audio"
                    );
                    return Ok(AcquisitionResult {
                        content: acquired.bytes,
                        mime_type: acquired.mime_type,
                    });
                }
                // A buffer under the floor is a failure no matter what the
                // strategy thought of it
                Ok(Ok(acquired)) => StrategyError::TooSmall {
                    size: acquired.bytes.len(),
                    floor,
                },
                Ok(Err(err)) => err,
                Err(_) => StrategyError::Timeout(budget),
            };

            self.tracker.record_failure(strategy.name());
            warn!(
                content_id = content_id,
                strategy = strategy.name(),
                error = %error,
                elapsed_ms = elapsed.as_millis() as u64,
                "Strategy failed"
            );
            attempts.push(StrategyFailure {
                strategy: strategy.name(),
                error,
                elapsed,
            });
        }

        Err(AcquisitionError::Exhausted { attempts })
    }

    /// Time left for the next attempt: the per-attempt cap, clipped to
    /// whatever remains of the overall deadline
    fn attempt_budget(&self, deadline: Instant) -> Duration {
        deadline
            .saturating_duration_since(Instant::now())
            .min(self.config.attempt_timeout)
    }

    /// Fetch a known direct URL with a bounded budget, applying the same
    /// plausibility floor as strategy results
    async fn fetch_direct(
        &self,
        url: &str,
        budget: Duration,
        floor: usize,
    ) -> Result<Bytes, StrategyError> {
        let url = url
            .parse::<url::Url>()
            .map_err(|_| StrategyError::Url(url.to_string()))?;

        let fetch = async {
            let response = self.client.get(url).send().await?;
            if !response.status().is_success() {
                return Err(StrategyError::StatusCode(response.status()));
            }
            let bytes = response.bytes().await?;
            if bytes.len() < floor {
                return Err(StrategyError::TooSmall {
                    size: bytes.len(),
                    floor,
                });
            }
            Ok(bytes)
        };

        match tokio::time::timeout(budget, fetch).await {
            Ok(result) => result,
            Err(_) => Err(StrategyError::Timeout(budget)),
        }
    }
}
