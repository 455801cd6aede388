use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::client::ProxyConfig;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Configurable options for the acquisition engine
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Upper bound on one whole `acquire` call, across every strategy tried
    pub overall_deadline: Duration,

    /// Upper bound on a single strategy attempt (clipped to whatever is
    /// left of the overall deadline)
    pub attempt_timeout: Duration,

    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// Streaming strategies abort when no chunk arrives within this window
    pub stall_timeout: Duration,

    /// Results below this size are rejected as implausible audio.
    /// Error pages from upstream tend to be small HTML bodies; real audio
    /// is not. Tune against the chosen source rather than trusting the
    /// default.
    pub min_content_size: usize,

    /// How long a resolved direct URL stays reusable
    pub cache_ttl: Duration,

    /// Maximum number of cached format entries
    pub cache_capacity: u64,

    /// Maximum number of `acquire` calls in flight at once; further calls
    /// fail fast with a retryable error
    pub max_concurrency: usize,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// User agent string
    pub user_agent: String,

    /// Custom HTTP headers for requests
    pub headers: HeaderMap,

    /// Proxy configuration (optional)
    pub proxy: Option<ProxyConfig>,

    /// Whether to use system proxy settings if available
    pub use_system_proxy: bool,

    /// Base URL of a third-party extraction mirror; the mirror strategy is
    /// only registered when this is set
    pub mirror_api: Option<String>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            overall_deadline: Duration::from_secs(45),
            attempt_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            stall_timeout: Duration::from_secs(5),
            min_content_size: 1000,
            cache_ttl: Duration::from_secs(6 * 3600),
            cache_capacity: 1000,
            max_concurrency: 5,
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: AcquisitionConfig::get_default_headers(),
            proxy: None,
            use_system_proxy: true, // Enable system proxy by default
            mirror_api: None,
        }
    }
}

impl AcquisitionConfig {
    pub fn builder() -> crate::builder::AcquisitionConfigBuilder {
        crate::builder::AcquisitionConfigBuilder::new()
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();

        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("*/*"),
        );

        default_headers.insert(
            reqwest::header::ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate, br"),
        );

        default_headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );

        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );
        default_headers
    }
}
