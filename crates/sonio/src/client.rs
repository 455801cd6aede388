//! Shared HTTP client construction: TLS setup, redirect policy, and proxy
//! wiring. One client instance is built per orchestrator and reused by the
//! cache fetch path and every strategy.

use reqwest::{Client, Proxy};
use rustls::{ClientConfig, crypto::aws_lc_rs};
use rustls_platform_verifier::BuilderVerifierExt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{AcquisitionConfig, AcquisitionError};

/// Proxy configuration types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyType {
    /// HTTP proxy
    Http,
    /// HTTPS proxy
    Https,
    /// SOCKS5 proxy
    Socks5,
}

/// Proxy authentication
#[derive(Debug, Clone)]
pub struct ProxyAuth {
    /// Username for proxy authentication
    pub username: String,
    /// Password for proxy authentication
    pub password: String,
}

/// Proxy configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Proxy server URL (e.g., "http://proxy.example.com:8080")
    pub url: String,
    /// Type of proxy (HTTP, HTTPS, SOCKS5)
    pub proxy_type: ProxyType,
    /// Authentication for the proxy (optional)
    pub auth: Option<ProxyAuth>,
}

fn build_proxy(config: &ProxyConfig) -> Result<Proxy, String> {
    let mut proxy = match config.proxy_type {
        ProxyType::Http => {
            Proxy::http(&config.url).map_err(|e| format!("invalid HTTP proxy URL: {e}"))?
        }
        ProxyType::Https => {
            Proxy::https(&config.url).map_err(|e| format!("invalid HTTPS proxy URL: {e}"))?
        }
        ProxyType::Socks5 => {
            // SOCKS5 proxies apply to every scheme, and reqwest needs the
            // socks5:// prefix to route through one
            let url = if config.url.starts_with("socks5://") {
                config.url.clone()
            } else {
                format!("socks5://{}", config.url)
            };
            Proxy::all(&url).map_err(|e| format!("invalid SOCKS5 proxy URL: {e}"))?
        }
    };

    if let Some(auth) = &config.auth {
        proxy = proxy.basic_auth(&auth.username, &auth.password);
    }

    Ok(proxy)
}

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &AcquisitionConfig) -> Result<Client, AcquisitionError> {
    // Create the crypto provider
    let provider = Arc::new(aws_lc_rs::default_provider());

    // Build platform default TLS configuration
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("Failed to configure default TLS protocol versions")
        .with_platform_verifier()
        .unwrap()
        .with_no_client_auth();

    let mut client_builder = Client::builder()
        .pool_max_idle_per_host(5) // Allow multiple connections to same host
        .user_agent(&config.user_agent)
        .default_headers(config.headers.clone())
        .use_preconfigured_tls(tls_config)
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        });

    if !config.attempt_timeout.is_zero() {
        client_builder = client_builder.timeout(config.attempt_timeout);
    }

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    // Set up proxy configuration
    if let Some(proxy_config) = &config.proxy {
        // Explicit proxy configuration takes precedence
        let proxy = match build_proxy(proxy_config) {
            Ok(p) => p,
            Err(e) => return Err(AcquisitionError::ProxyError(e)),
        };
        client_builder = client_builder.proxy(proxy);
        info!(proxy_url = %proxy_config.url, "Using explicitly configured proxy for acquisition");
    } else if config.use_system_proxy {
        // No explicit proxy but system proxy enabled
        // reqwest will use system proxy settings by default when we don't call no_proxy()
        info!("Using system proxy settings for acquisition");
    } else {
        // Explicitly disable proxy
        client_builder = client_builder.no_proxy();
        debug!("Proxy disabled for acquisition");
    }

    client_builder.build().map_err(AcquisitionError::from)
}
