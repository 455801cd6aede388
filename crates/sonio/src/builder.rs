//! # Builder for AcquisitionConfig
//!
//! Fluent API for assembling an [`AcquisitionConfig`], mirroring how the
//! engine is usually configured from a CLI or an embedding service.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use sonio_engine::AcquisitionConfig;
//!
//! let config = AcquisitionConfig::builder()
//!     .with_attempt_timeout(Duration::from_secs(20))
//!     .with_overall_deadline(Duration::from_secs(40))
//!     .with_user_agent("MyApp/1.0")
//!     .with_min_content_size(4096)
//!     .build();
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::{AcquisitionConfig, client::ProxyConfig};

/// Builder for creating AcquisitionConfig instances with a fluent API
#[derive(Debug, Clone)]
pub struct AcquisitionConfigBuilder {
    /// Internal config being built
    config: AcquisitionConfig,
}

impl AcquisitionConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: AcquisitionConfig::default(),
        }
    }

    /// Set the upper bound on one whole acquisition call
    pub fn with_overall_deadline(mut self, deadline: Duration) -> Self {
        self.config.overall_deadline = deadline;
        self
    }

    /// Set the upper bound on a single strategy attempt
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.config.attempt_timeout = timeout;
        self
    }

    /// Set the connection timeout (time to establish initial connection)
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the no-data stall window for streaming strategies
    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.config.stall_timeout = timeout;
        self
    }

    /// Set the minimum plausible result size in bytes
    pub fn with_min_content_size(mut self, floor: usize) -> Self {
        self.config.min_content_size = floor;
        self
    }

    /// Set how long resolved direct URLs stay reusable
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    /// Set the maximum number of cached format entries
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Set the admission ceiling for concurrent acquisitions
    pub fn with_max_concurrency(mut self, ceiling: usize) -> Self {
        self.config.max_concurrency = ceiling;
        self
    }

    /// Set whether to follow redirects
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.config.follow_redirects = follow;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add a custom HTTP header
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.as_ref().parse::<reqwest::header::HeaderName>(),
            HeaderValue::from_str(value.as_ref()),
        ) {
            self.config.headers.insert(name, value);
        }
        self
    }

    /// Set all HTTP headers, replacing any existing headers
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.config.headers = headers;
        self
    }

    /// Set the proxy configuration
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.config.proxy = Some(proxy);
        self.config.use_system_proxy = false; // Explicit proxy overrides system proxy
        self
    }

    /// Set whether to use system proxy settings if available
    pub fn with_system_proxy(mut self, use_system_proxy: bool) -> Self {
        // Only set system proxy if no explicit proxy is configured
        if self.config.proxy.is_none() {
            self.config.use_system_proxy = use_system_proxy;
        }
        self
    }

    /// Set the base URL of a third-party extraction mirror
    pub fn with_mirror_api(mut self, base: impl Into<String>) -> Self {
        self.config.mirror_api = Some(base.into());
        self
    }

    /// Build the AcquisitionConfig instance
    pub fn build(self) -> AcquisitionConfig {
        self.config
    }
}

impl Default for AcquisitionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{ProxyAuth, ProxyType};

    use super::*;
    use std::time::Duration;

    #[test]
    fn test_builder_defaults() {
        let config = AcquisitionConfigBuilder::new().build();
        assert_eq!(config.overall_deadline, Duration::from_secs(45));
        assert_eq!(config.attempt_timeout, Duration::from_secs(30));
        assert_eq!(config.stall_timeout, Duration::from_secs(5));
        assert_eq!(config.min_content_size, 1000);
        assert_eq!(config.max_concurrency, 5);
        assert_eq!(config.cache_capacity, 1000);
        assert!(config.follow_redirects);
        assert!(config.use_system_proxy);
        assert!(config.mirror_api.is_none());
    }

    #[test]
    fn test_builder_customization() {
        let config = AcquisitionConfigBuilder::new()
            .with_overall_deadline(Duration::from_secs(60))
            .with_attempt_timeout(Duration::from_secs(20))
            .with_stall_timeout(Duration::from_secs(3))
            .with_min_content_size(4096)
            .with_max_concurrency(10)
            .with_follow_redirects(false)
            .with_user_agent("CustomUserAgent/1.0")
            .with_header("X-Custom-Header", "CustomValue")
            .with_system_proxy(false)
            .with_mirror_api("https://mirror.example.com")
            .build();

        assert_eq!(config.overall_deadline, Duration::from_secs(60));
        assert_eq!(config.attempt_timeout, Duration::from_secs(20));
        assert_eq!(config.stall_timeout, Duration::from_secs(3));
        assert_eq!(config.min_content_size, 4096);
        assert_eq!(config.max_concurrency, 10);
        assert!(!config.follow_redirects);
        assert_eq!(config.user_agent, "CustomUserAgent/1.0");
        assert!(!config.use_system_proxy);
        assert_eq!(
            config.mirror_api.as_deref(),
            Some("https://mirror.example.com")
        );

        // Verify custom header
        let header_value = config.headers.get("X-Custom-Header").unwrap();
        assert_eq!(header_value.to_str().unwrap(), "CustomValue");
    }

    #[test]
    fn test_proxy_configuration() {
        let proxy_config = ProxyConfig {
            url: "http://proxy.example.com:8080".to_string(),
            proxy_type: ProxyType::Http,
            auth: Some(ProxyAuth {
                username: "user".to_string(),
                password: "pass".to_string(),
            }),
        };

        let config = AcquisitionConfigBuilder::new()
            .with_proxy(proxy_config.clone())
            .build();

        assert!(config.proxy.is_some());
        // Explicit proxy disables system proxy
        assert!(!config.use_system_proxy);

        let stored = config.proxy.unwrap();
        assert_eq!(stored.url, proxy_config.url);
        assert_eq!(stored.proxy_type, ProxyType::Http);
        assert_eq!(stored.auth.as_ref().unwrap().username, "user");
    }

    #[test]
    fn test_system_proxy_does_not_override_explicit_proxy() {
        let config = AcquisitionConfigBuilder::new()
            .with_proxy(ProxyConfig {
                url: "socks5://127.0.0.1:1080".to_string(),
                proxy_type: ProxyType::Socks5,
                auth: None,
            })
            .with_system_proxy(true)
            .build();

        assert!(config.proxy.is_some());
        assert!(!config.use_system_proxy);
    }
}
