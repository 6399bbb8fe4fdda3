//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use gdfetch_core::{DEFAULT_MAX_ATTEMPTS, FetchConfig};

/// Download a file from a URL.
///
/// Google Drive `uc?id=` links are followed through the "can't scan this
/// file for viruses" confirmation page.
#[derive(Parser, Debug)]
#[command(name = "gdfetch")]
#[command(author, about, disable_version_flag = true)]
pub struct Args {
    /// URL to download file from
    #[arg(required_unless_present = "version")]
    pub url: Option<String>,

    /// Output filename
    #[arg(short = 'O', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Suppress standard output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print version and install location, then exit
    #[arg(short = 'V', long)]
    pub version: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Maximum requests while following confirmation pages (1-100)
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_attempts: u32,

    /// Connect timeout in seconds (none by default)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub connect_timeout: Option<u64>,

    /// Whole-request timeout in seconds, including the transfer (none by default)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl Args {
    /// Builds the fetcher configuration from the parsed flags.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::default()
            .with_max_attempts(self.max_attempts)
            .with_timeouts(
                self.connect_timeout.map(Duration::from_secs),
                self.timeout.map(Duration::from_secs),
            )
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}
