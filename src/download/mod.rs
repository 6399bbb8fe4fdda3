//! Single-file download with Google Drive confirmation handling.
//!
//! # Features
//!
//! - Confirmation-page resolution for `drive.google.com/uc?id=` links,
//!   bounded by [`FetchConfig::max_attempts`]
//! - One cookie-carrying session per [`Fetcher`]
//! - Streaming writes in fixed [`CHUNK_SIZE`] chunks with a progress indicator
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use gdfetch_core::download::{FetchConfig, Fetcher};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new(FetchConfig::default())?;
//! let outcome = fetcher
//!     .download("https://example.com/archive.tar.gz", Some(Path::new("archive.tar.gz")), true)
//!     .await?;
//! println!("Downloaded: {}", outcome.path.display());
//! # Ok(())
//! # }
//! ```

mod config;
mod constants;
mod error;
mod fetcher;
mod filename;
mod progress;

pub use config::FetchConfig;
pub use constants::{CHUNK_SIZE, DEFAULT_MAX_ATTEMPTS, GOOGLE_DOCS_HOST};
pub use error::DownloadError;
pub use fetcher::{DownloadOutcome, Fetcher};
