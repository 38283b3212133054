use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "remote-image",
    version,
    about = "Fetch, cache and decode remote images",
    long_about = None
)]
pub struct CliArgs {
    /// Image URLs to load.
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Cache backend (disabled, memory, filesystem).
    #[arg(long, value_name = "BACKEND")]
    pub cache: Option<String>,

    /// Directory for the filesystem cache.
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Maximum concurrent downloads.
    #[arg(long)]
    pub max_concurrent_fetches: Option<usize>,

    /// Image shown until a download completes.
    #[arg(long, value_name = "PATH")]
    pub fallback_image: Option<PathBuf>,

    /// Directory where decoded images are written as PNG.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Frame interval in milliseconds.
    #[arg(long, default_value_t = 16)]
    pub tick_ms: u64,

    /// Give up after this many seconds.
    #[arg(long, default_value_t = 60)]
    pub deadline_secs: u64,
}
