//! Fetcher configuration.

use std::time::Duration;

use super::constants::{CHUNK_SIZE, DEFAULT_MAX_ATTEMPTS, GOOGLE_DOCS_HOST};
use crate::user_agent;

/// Settings for a [`Fetcher`](super::Fetcher).
///
/// Built once at startup and never mutated afterwards. No timeouts are set
/// by default, so a stalled server blocks the download indefinitely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Maximum GET requests while following confirmation pages (at least 1).
    pub max_attempts: u32,
    /// Bytes per write to the output file.
    pub chunk_size: usize,
    /// TCP connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Whole-request timeout, covering the body transfer.
    pub read_timeout: Option<Duration>,
    /// User-Agent header sent on every request.
    pub user_agent: String,
    /// Base prefixed to relative `/uc?export=download` links.
    pub docs_host: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            chunk_size: CHUNK_SIZE,
            connect_timeout: None,
            read_timeout: None,
            user_agent: user_agent::default_user_agent(),
            docs_host: GOOGLE_DOCS_HOST.to_string(),
        }
    }
}

impl FetchConfig {
    /// Sets the attempt limit. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the connect and whole-request timeouts.
    #[must_use]
    pub fn with_timeouts(
        mut self,
        connect_timeout: Option<Duration>,
        read_timeout: Option<Duration>,
    ) -> Self {
        self.connect_timeout = connect_timeout;
        self.read_timeout = read_timeout;
        self
    }

    /// Overrides the host prefixed to scraped download links.
    #[must_use]
    pub fn with_docs_host(mut self, docs_host: impl Into<String>) -> Self {
        self.docs_host = docs_host.into().trim_end_matches('/').to_string();
        self
    }
}
