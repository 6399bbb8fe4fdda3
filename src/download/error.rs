//! Error types for the download module.
//!
//! This module defines structured errors for all download operations,
//! providing context-rich error messages for debugging and user feedback.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving or downloading a file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// No continuation URL could be scraped from a Google Drive confirmation page.
    ///
    /// Carries the originally requested URL. No output file is created.
    #[error("permission denied: {url}")]
    PermissionDenied {
        /// The URL the caller asked for.
        url: String,
    },

    /// Confirmation pages kept yielding new URLs past the attempt limit.
    #[error("gave up on {url} after {attempts} attempts without reaching the file")]
    TooManyAttempts {
        /// The URL the caller asked for.
        url: String,
        /// Number of GET requests made.
        attempts: u32,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url:?}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// A Google Drive Content-Disposition header without a `filename="..."` part.
    #[error("malformed Content-Disposition header: {header}")]
    MalformedDisposition {
        /// The raw header value.
        header: String,
    },

    /// No output filename could be derived from the resolved URL.
    #[error("cannot derive an output filename from {url}; pass --output")]
    MissingFilename {
        /// The resolved URL.
        url: String,
    },

    /// The HTTP session could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Creates a permission-denied error for the originally requested URL.
    pub fn permission_denied(url: impl Into<String>) -> Self {
        Self::PermissionDenied { url: url.into() }
    }

    /// Creates an attempt-limit error.
    pub fn too_many_attempts(url: impl Into<String>, attempts: u32) -> Self {
        Self::TooManyAttempts {
            url: url.into(),
            attempts,
        }
    }

    /// Creates a network error from a reqwest error.
    ///
    /// Timeouts are reported as [`DownloadError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::timeout(url);
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a malformed disposition header error.
    pub fn malformed_disposition(header: impl Into<String>) -> Self {
        Self::MalformedDisposition {
            header: header.into(),
        }
    }

    /// Creates a missing filename error.
    pub fn missing_filename(url: impl Into<String>) -> Self {
        Self::MissingFilename { url: url.into() }
    }
}

// No From<reqwest::Error> / From<std::io::Error>: every variant needs the url
// or path the source error lacks, so callers go through the constructors.
