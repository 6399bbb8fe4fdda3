//! CLI entry point for gdfetch.

use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use gdfetch_core::{BuildInfo, DownloadError, Fetcher};
use tracing::{debug, info};

mod cli;

use cli::Args;

/// Process outcome, mapped to the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    Failure,
    PermissionDenied,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            // 2 is taken by clap usage errors.
            Self::PermissionDenied => 3,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit.code())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    if args.version {
        println!("{}", BuildInfo::current());
        return ExitCode::SUCCESS;
    }

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    match run(&args).await {
        Ok(exit) => exit.into(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ProcessExit::Failure.into()
        }
    }
}

async fn run(args: &Args) -> Result<ProcessExit> {
    let url = args.url.as_deref().context("missing URL argument")?;
    let fetcher = Fetcher::new(args.fetch_config())?;

    match fetcher.download(url, args.output.as_deref(), args.quiet).await {
        Ok(outcome) => {
            info!(
                path = %outcome.path.display(),
                bytes = outcome.bytes_written,
                attempts = outcome.attempts,
                "saved"
            );
            Ok(ProcessExit::Success)
        }
        Err(err) => {
            let (exit, message) = failure_exit(url, err);
            eprintln!("{message}");
            Ok(exit)
        }
    }
}

/// Maps a failed download to the process exit and the line printed to stderr.
fn failure_exit(url: &str, err: DownloadError) -> (ProcessExit, String) {
    match err {
        DownloadError::PermissionDenied { url } => {
            (ProcessExit::PermissionDenied, format!("Permission denied: {url}"))
        }
        err => {
            let err = anyhow!(err).context(format!("failed to download {url}"));
            (ProcessExit::Failure, format!("Error: {err:#}"))
        }
    }
}
