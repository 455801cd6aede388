use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use error::AppError;
use sonio_engine::{
    AcquisitionConfig, AcquisitionOrchestrator, ProxyAuth, ProxyConfig, ProxyType,
};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod error;
mod utils;

use cli::CliArgs;
use utils::{extension_for, is_valid_content_id, parse_headers};

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        // Log the full error for debugging
        error!(error = ?e, "Application failed");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn bootstrap() -> Result<(), AppError> {
    // Parse command-line arguments
    let args = CliArgs::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Initialization(e.to_string()))?;

    info!("Sonio - adaptive audio acquisition");
    info!("==================================");

    // Reject malformed ids before spending any network time on them
    for id in &args.ids {
        if !is_valid_content_id(id) {
            return Err(AppError::InvalidInput(format!(
                "'{id}' is not an 11-character content id"
            )));
        }
    }

    // Handle proxy configuration
    let (proxy_config, use_system_proxy) = if args.no_proxy {
        // No proxy flag overrides everything else
        info!("All proxy settings disabled (--no-proxy flag)");
        (None, false)
    } else if let Some(proxy_url) = args.proxy.as_ref() {
        // Explicit proxy configuration
        let proxy_type = match args.proxy_type.as_str() {
            "http" => ProxyType::Http,
            "https" => ProxyType::Https,
            "socks5" => ProxyType::Socks5,
            _ => {
                return Err(AppError::InvalidInput(format!(
                    "Invalid proxy type: '{}'",
                    args.proxy_type
                )));
            }
        };

        // Configure proxy authentication if both username and password are provided
        let auth = if let (Some(username), Some(password)) = (&args.proxy_user, &args.proxy_pass) {
            Some(ProxyAuth {
                username: username.clone(),
                password: password.clone(),
            })
        } else {
            None
        };

        info!(
            proxy_url = %proxy_url,
            proxy_type = ?proxy_type,
            has_auth = auth.is_some(),
            "Using explicit proxy configuration"
        );

        (
            Some(ProxyConfig {
                url: proxy_url.clone(),
                proxy_type,
                auth,
            }),
            false,
        )
    } else if args.use_system_proxy {
        info!("Using system proxy settings");
        (None, true)
    } else {
        info!("No proxy settings configured");
        (None, false)
    };

    info!(
        "Timeout configuration: attempt={}s, deadline={}s, connect={}s, stall={}s",
        args.timeout, args.deadline, args.connect_timeout, args.stall_timeout
    );

    // Assemble the engine configuration
    let config = {
        let mut builder = AcquisitionConfig::builder()
            .with_attempt_timeout(Duration::from_secs(args.timeout))
            .with_overall_deadline(Duration::from_secs(args.deadline))
            .with_connect_timeout(Duration::from_secs(args.connect_timeout))
            .with_stall_timeout(Duration::from_secs(args.stall_timeout))
            .with_min_content_size(args.min_size)
            .with_headers(parse_headers(&args.headers));

        if let Some(mirror) = &args.mirror_api {
            builder = builder.with_mirror_api(mirror.as_str());
        }

        if let Some(proxy) = proxy_config {
            builder = builder.with_proxy(proxy);
        } else {
            builder = builder.with_system_proxy(use_system_proxy);
        }
        builder.build()
    };

    let orchestrator = AcquisitionOrchestrator::new(config)
        .map_err(|e| AppError::Initialization(e.to_string()))?;

    // Determine output directory
    let output_dir = args.output_dir.unwrap_or_else(|| PathBuf::from("./audio"));
    tokio::fs::create_dir_all(&output_dir).await?;

    let mut failed = 0usize;
    for id in &args.ids {
        match orchestrator.acquire(id).await {
            Ok(result) => {
                let path = output_dir.join(format!("{id}.{}", extension_for(&result.mime_type)));
                tokio::fs::write(&path, &result.content).await?;
                info!(
                    content_id = %id,
                    path = %path.display(),
                    size = result.size_bytes(),
                    mime_type = %result.mime_type,
                    "Saved acquired audio"
                );
            }
            Err(err) if err.is_retryable() => {
                warn!(content_id = %id, "Engine at capacity, retry later");
                failed += 1;
            }
            Err(err) => {
                warn!(content_id = %id, error = %err, "Could not acquire audio");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(AppError::Incomplete {
            failed,
            total: args.ids.len(),
        });
    }

    Ok(())
}
