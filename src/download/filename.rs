//! Output filename derivation and sanitization.
//!
//! Names come from, in order: an explicit output path (used verbatim), the
//! `filename="..."` part of a Google Drive Content-Disposition header, or the
//! last path segment of the resolved URL.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use super::error::DownloadError;

/// Greedy `filename="..."` capture, as Drive sends
/// `attachment;filename="x.zip";filename*=UTF-8''x.zip`.
#[allow(clippy::expect_used)]
static DISPOSITION_FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"filename="(.*)""#).expect("filename regex is valid")
});

/// Picks the output path for a resolved response.
///
/// An explicit `output` wins. Otherwise Google Drive downloads take the name
/// from the disposition header and everything else from the URL.
///
/// # Errors
///
/// - [`DownloadError::MalformedDisposition`] when a Drive download's header
///   has no `filename="..."` part (or no header at all)
/// - [`DownloadError::MissingFilename`] when the URL has no usable last segment
pub(crate) fn output_path(
    output: Option<&Path>,
    is_drive: bool,
    disposition: Option<&str>,
    resolved_url: &str,
) -> Result<PathBuf, DownloadError> {
    if let Some(output) = output {
        return Ok(output.to_path_buf());
    }

    if is_drive {
        let header = disposition.unwrap_or_default();
        let name = disposition_filename(header)
            .ok_or_else(|| DownloadError::malformed_disposition(header))?;
        return Ok(PathBuf::from(sanitize_filename(&name)));
    }

    filename_from_url(resolved_url)
        .map(PathBuf::from)
        .ok_or_else(|| DownloadError::missing_filename(resolved_url))
}

/// Extracts the quoted `filename="..."` value from a Content-Disposition header.
pub(crate) fn disposition_filename(header: &str) -> Option<String> {
    DISPOSITION_FILENAME_PATTERN
        .captures(header)
        .map(|caps| caps[1].to_string())
}

/// Last non-empty path segment of `url`, percent-decoded and sanitized.
pub(crate) fn filename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(last).unwrap_or_else(|e| {
        debug!(segment = %last, error = %e, "URL decoding failed, using raw segment");
        last.into()
    });
    Some(sanitize_filename(&decoded))
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
