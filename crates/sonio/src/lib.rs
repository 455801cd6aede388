//! # Sonio
//!
//! An adaptive audio acquisition engine. Given an external content id,
//! Sonio returns the audio bytes plus their MIME type by trying a
//! prioritized sequence of independent acquisition strategies, each with
//! a bounded time budget, until one succeeds or all fail.
//!
//! ## Features
//!
//! - Multiple acquisition strategies (direct format fetch, chunked
//!   streaming, third-party extraction mirror)
//! - Adaptive strategy ordering from rolling success/latency statistics
//! - Short-lived caching of resolved direct media URLs
//! - Per-attempt timeouts, stall aborts, and an overall deadline
//! - Admission control for concurrent acquisitions

pub mod builder;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod resolver;
pub mod strategies;
pub mod strategy;
pub mod tracker;

pub use builder::AcquisitionConfigBuilder;
pub use cache::{CachedFormat, FormatCache};
pub use client::{ProxyAuth, ProxyConfig, ProxyType, create_client};
pub use config::AcquisitionConfig;
pub use error::{AcquisitionError, StrategyError, StrategyFailure};
pub use orchestrator::{AcquisitionOrchestrator, AcquisitionResult};
pub use strategies::{DirectFormatStrategy, MirrorApiStrategy, StreamingChunkStrategy};
pub use strategy::{Acquired, Strategy};
pub use tracker::{StrategyPerformanceTracker, StrategyStats};
