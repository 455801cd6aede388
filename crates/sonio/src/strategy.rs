//! # Acquisition Strategy Trait
//!
//! Every way of turning a content id into audio bytes implements one
//! capability: [`Strategy::attempt`]. Strategies are stateless; the
//! orchestrator owns the shared cache and performance counters and
//! updates them on a strategy's behalf, so a failed attempt leaves no
//! partial shared state behind.

use async_trait::async_trait;
use bytes::Bytes;

use crate::StrategyError;

/// Audio produced by a single successful strategy attempt
#[derive(Debug, Clone)]
pub struct Acquired {
    /// The audio payload
    pub bytes: Bytes,
    /// MIME type of the payload, e.g. `audio/mp4`
    pub mime_type: String,
    /// Direct media URL the bytes came from, when the strategy resolved
    /// one worth reusing; the orchestrator caches it for repeat requests
    pub direct_url: Option<String>,
}

/// One independent method of acquiring audio for a content id
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Stable name used for stats tracking and diagnostics
    fn name(&self) -> &'static str;

    /// Estimated success rate before any attempts have been recorded
    fn prior(&self) -> f64 {
        0.5
    }

    /// Try to acquire the audio for `content_id`.
    ///
    /// Implementations must bound every network call, reject implausibly
    /// small results, and must not touch shared engine state.
    async fn attempt(&self, content_id: &str) -> Result<Acquired, StrategyError>;
}
