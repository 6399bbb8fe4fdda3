//! gdfetch Core Library
//!
//! Downloads a single file from a URL. Google Drive "large file" links are
//! special-cased: when Drive answers with a confirmation page instead of the
//! file, the continuation link is scraped out of the page and requested next.
//!
//! # Architecture
//!
//! - [`download`] - The [`Fetcher`]: resolution loop and streaming transfer
//! - [`gdrive`] - Google Drive URL classification and confirmation page scraping
//! - [`build_info`] - Build-time version information

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod build_info;
pub mod download;
pub mod gdrive;
mod user_agent;

// Re-export commonly used types
pub use build_info::BuildInfo;
pub use download::{
    CHUNK_SIZE, DEFAULT_MAX_ATTEMPTS, DownloadError, DownloadOutcome, FetchConfig, Fetcher,
};
pub use gdrive::{Continuation, find_continuation, is_google_drive_url};
