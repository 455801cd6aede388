use clap::Parser;
use std::path::PathBuf;

/// Define CLI arguments
#[derive(Parser)]
#[command(
    version,
    about = "Adaptive audio acquisition tool",
    long_about = "Acquires audio content by id, trying several independent download\n\
                  methods in an adaptively prioritized order: direct format fetch,\n\
                  chunked streaming, and an optional third-party extraction mirror.\n\
                  Successful methods are remembered and tried first on later runs."
)]
pub struct CliArgs {
    /// Content id(s) to acquire
    #[arg(required = true, help = "One or more 11-character content ids to acquire")]
    pub ids: Vec<String>,

    /// Output directory for acquired audio
    #[arg(
        short,
        long,
        help = "Directory where acquired audio files will be saved (default: ./audio)"
    )]
    pub output_dir: Option<PathBuf>,

    /// Per-attempt timeout in seconds
    #[arg(
        long,
        default_value = "30",
        help = "Timeout in seconds for a single acquisition attempt"
    )]
    pub timeout: u64,

    /// Overall deadline in seconds
    #[arg(
        long,
        default_value = "45",
        help = "Overall deadline in seconds for one acquisition across all methods"
    )]
    pub deadline: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value = "10",
        help = "Connection timeout in seconds (time to establish initial connection)"
    )]
    pub connect_timeout: u64,

    /// Stall timeout in seconds
    #[arg(
        long,
        default_value = "5",
        help = "Abort a streaming attempt when no data arrives for this many seconds"
    )]
    pub stall_timeout: u64,

    /// Minimum plausible result size in bytes
    #[arg(
        long,
        default_value = "1000",
        help = "Reject results smaller than this many bytes (guards against error pages served as audio)"
    )]
    pub min_size: usize,

    /// Base URL of a third-party extraction mirror
    #[arg(
        long,
        help = "Base URL of a Piped-compatible extraction mirror to use as a fallback method"
    )]
    pub mirror_api: Option<String>,

    /// Proxy URL (e.g., "http://proxy.example.com:8080")
    #[arg(
        long,
        help = "Proxy server URL for acquisition requests (e.g., \"http://proxy.example.com:8080\")"
    )]
    pub proxy: Option<String>,

    /// Proxy type (http, https, socks5)
    #[arg(
        long,
        default_value = "http",
        help = "Proxy type (http, https, socks5)",
        value_parser = ["http", "https", "socks5"]
    )]
    pub proxy_type: String,

    /// Proxy username
    #[arg(long, help = "Username for proxy authentication")]
    pub proxy_user: Option<String>,

    /// Proxy password
    #[arg(long, help = "Password for proxy authentication")]
    pub proxy_pass: Option<String>,

    /// Use system proxy settings
    #[arg(
        long,
        default_value = "true",
        help = "Use system proxy settings if no explicit proxy is configured"
    )]
    pub use_system_proxy: bool,

    /// Disable all proxy settings
    #[arg(
        long,
        help = "Disable all proxy settings (including system proxy) for acquisition"
    )]
    pub no_proxy: bool,

    /// Custom HTTP headers for acquisition requests
    #[arg(
        long = "header",
        short = 'H',
        help = "Add custom HTTP header to requests (can be used multiple times). Format: 'Name: Value'",
        value_name = "HEADER"
    )]
    pub headers: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,
}
