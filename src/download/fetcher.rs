//! The [`Fetcher`]: confirmation-page resolution and streaming transfer.
//!
//! A download runs in two phases. Resolution issues GET requests until a
//! response carries a Content-Disposition header (or, for non-Drive URLs,
//! after the first response). Transfer then writes that response body to the
//! output file in fixed-size chunks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH};
use reqwest::{Client, Response, cookie::Jar};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::config::FetchConfig;
use super::error::DownloadError;
use super::filename;
use super::progress::TransferProgress;
use crate::gdrive;

/// Downloads single files, following Google Drive confirmation pages.
///
/// Every request goes through one cookie-carrying session, so cookies Drive
/// sets on its confirmation page are sent with the follow-up request.
///
/// # Example
///
/// ```no_run
/// use gdfetch_core::{FetchConfig, Fetcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Fetcher::new(FetchConfig::default())?;
/// let outcome = fetcher
///     .download("https://drive.google.com/uc?id=0B9P1L--7Wd2vNm9zMTJWOGxobkU", None, false)
///     .await?;
/// println!("Saved {} bytes to {}", outcome.bytes_written, outcome.path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

/// Result of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Path the file was written to, as given or derived (not absolutized).
    pub path: PathBuf,
    /// Bytes written to the file.
    pub bytes_written: u64,
    /// Number of chunk writes issued.
    pub chunks: u64,
    /// Content-Length declared by the final response, if any.
    pub content_length: Option<u64>,
    /// GET requests made during resolution.
    pub attempts: u32,
    /// The URL whose body was saved.
    pub resolved_url: String,
}

/// The response that resolution settled on.
#[derive(Debug)]
struct Resolved {
    response: Response,
    url: String,
    attempts: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct TransferStats {
    bytes: u64,
    chunks: u64,
}

impl Fetcher {
    /// Creates a fetcher with its own cookie-carrying session.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the HTTP client cannot be built
    /// (for example, no TLS backend is available).
    pub fn new(config: FetchConfig) -> Result<Self, DownloadError> {
        let client = build_client(&config)
            .map_err(|source| DownloadError::ClientBuild { source })?;
        Ok(Self { client, config })
    }

    /// Downloads `url` to `output` (or a derived filename).
    ///
    /// Google Drive `uc?id=` links have their confirmation pages resolved
    /// first; every other URL is fetched with a single GET.
    ///
    /// Unless `quiet`, prints a `Downloading...` status block to stdout and
    /// draws a progress indicator on stderr.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::PermissionDenied`] when a Drive confirmation page
    ///   holds no usable continuation; no file is created
    /// - [`DownloadError::TooManyAttempts`] when resolution hits the attempt limit
    /// - [`DownloadError::Network`], [`DownloadError::Timeout`] or
    ///   [`DownloadError::InvalidUrl`] for request failures
    /// - [`DownloadError::MalformedDisposition`] or
    ///   [`DownloadError::MissingFilename`] when no output name can be derived
    /// - [`DownloadError::Io`] when the output cannot be written; the partial
    ///   file is removed
    #[must_use = "download outcome contains the path to the saved file"]
    #[instrument(skip(self, output), fields(url = %url))]
    pub async fn download(
        &self,
        url: &str,
        output: Option<&Path>,
        quiet: bool,
    ) -> Result<DownloadOutcome, DownloadError> {
        let is_drive = gdrive::is_google_drive_url(url);
        self.download_classified(url, output, quiet, is_drive).await
    }

    /// Download with the Drive classification supplied by the caller.
    pub(crate) async fn download_classified(
        &self,
        url: &str,
        output: Option<&Path>,
        quiet: bool,
        is_drive: bool,
    ) -> Result<DownloadOutcome, DownloadError> {
        debug!(is_drive, "starting download");

        let resolved = self.resolve(url, is_drive).await?;

        let disposition = resolved
            .response
            .headers()
            .get(CONTENT_DISPOSITION)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
        let path = filename::output_path(output, is_drive, disposition.as_deref(), &resolved.url)?;
        debug!(path = %path.display(), "resolved output path");

        if !quiet {
            let shown = std::path::absolute(&path).unwrap_or_else(|_| path.clone());
            println!("Downloading...");
            println!("From: {url}");
            println!("To: {}", shown.display());
        }

        let content_length = declared_content_length(&resolved.response);
        let stats = self
            .transfer(resolved.response, &resolved.url, &path, content_length, quiet)
            .await?;

        if let Some(expected) = content_length
            && expected != stats.bytes
        {
            warn!(
                expected_bytes = expected,
                actual_bytes = stats.bytes,
                "body length differs from Content-Length"
            );
        }

        info!(
            path = %path.display(),
            bytes = stats.bytes,
            attempts = resolved.attempts,
            "download complete"
        );

        Ok(DownloadOutcome {
            path,
            bytes_written: stats.bytes,
            chunks: stats.chunks,
            content_length,
            attempts: resolved.attempts,
            resolved_url: resolved.url,
        })
    }

    /// Follows confirmation pages until a response is ready to save.
    async fn resolve(&self, url: &str, is_drive: bool) -> Result<Resolved, DownloadError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut working = url.to_string();

        for attempt in 1..=max_attempts {
            let response = self.get(&working).await?;

            if response.headers().contains_key(CONTENT_DISPOSITION) {
                debug!(attempt, url = %working, "response carries Content-Disposition");
                return Ok(Resolved {
                    response,
                    url: working,
                    attempts: attempt,
                });
            }

            if !is_drive {
                return Ok(Resolved {
                    response,
                    url: working,
                    attempts: attempt,
                });
            }

            let body = response
                .text()
                .await
                .map_err(|e| DownloadError::network(working.clone(), e))?;

            match gdrive::find_continuation(&body, &self.config.docs_host) {
                Some(next) if !next.url().is_empty() => {
                    debug!(
                        attempt,
                        kind = next.kind(),
                        next = %next.url(),
                        "following confirmation page"
                    );
                    working = next.into_url();
                }
                Some(next) => {
                    warn!(
                        kind = next.kind(),
                        "confirmation page yielded an empty URL; nothing to apply the token to"
                    );
                    return Err(DownloadError::permission_denied(url));
                }
                None => {
                    debug!(attempt, "no continuation found on confirmation page");
                    return Err(DownloadError::permission_denied(url));
                }
            }
        }

        warn!(max_attempts, "confirmation pages did not lead to a file");
        Err(DownloadError::too_many_attempts(url, max_attempts))
    }

    async fn get(&self, url: &str) -> Result<Response, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url, "server returned a non-success status");
        }
        Ok(response)
    }

    /// Writes the response body to `path`, removing the file if the transfer fails.
    async fn transfer(
        &self,
        response: Response,
        url: &str,
        path: &Path,
        content_length: Option<u64>,
        quiet: bool,
    ) -> Result<TransferStats, DownloadError> {
        let mut file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        let progress = TransferProgress::new(quiet, content_length);
        let result =
            stream_to_file(&mut file, response, url, path, self.config.chunk_size, &progress)
                .await;
        progress.finish();

        if result.is_err() {
            drop(file);
            remove_partial_file(path).await;
        }
        result
    }
}

/// Removes a partially written output file. Returns false if it is left behind.
async fn remove_partial_file(path: &Path) -> bool {
    debug!(path = %path.display(), "cleaning up partial file after error");
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove partial file");
            false
        }
    }
}

/// Streams the response body to `file` in `chunk_size` writes.
///
/// Network reads are re-buffered so every write except the last is exactly
/// `chunk_size` bytes, whatever sizes the body arrives in.
async fn stream_to_file(
    file: &mut File,
    response: Response,
    url: &str,
    path: &Path,
    chunk_size: usize,
    progress: &TransferProgress,
) -> Result<TransferStats, DownloadError> {
    let chunk_size = chunk_size.max(1);
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut pending: Vec<u8> = Vec::with_capacity(chunk_size);
    let mut stats = TransferStats::default();

    while let Some(next) = stream.next().await {
        let received = next.map_err(|e| DownloadError::network(url, e))?;
        let mut data: &[u8] = &received;

        while !data.is_empty() {
            let take = (chunk_size - pending.len()).min(data.len());
            pending.extend_from_slice(&data[..take]);
            data = &data[take..];

            if pending.len() == chunk_size {
                write_chunk(&mut writer, &pending, path, &mut stats, progress).await?;
                pending.clear();
            }
        }
    }

    if !pending.is_empty() {
        write_chunk(&mut writer, &pending, path, &mut stats, progress).await?;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    Ok(stats)
}

async fn write_chunk(
    writer: &mut BufWriter<&mut File>,
    chunk: &[u8],
    path: &Path,
    stats: &mut TransferStats,
    progress: &TransferProgress,
) -> Result<(), DownloadError> {
    writer
        .write_all(chunk)
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    stats.bytes += chunk.len() as u64;
    stats.chunks += 1;
    progress.advance(chunk.len());
    Ok(())
}

fn declared_content_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}

fn build_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .cookie_provider(Arc::new(Jar::default()))
        .gzip(true)
        .user_agent(config.user_agent.as_str());
    if let Some(timeout) = config.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = config.read_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
