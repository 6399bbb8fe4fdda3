//! Google Drive URL classification and confirmation page scraping.
//!
//! Large Drive files are not served directly: the first request returns an
//! HTML page asking the user to confirm the download. The page embeds the
//! continuation in one of three forms, tried per line in priority order:
//!
//! 1. an anchor `href="/uc?export=download..."` (relative to the Docs host)
//! 2. a `confirm=<token>` fragment
//! 3. a JSON field `"downloadUrl":"..."` with escaped `=`, `&` and `/`

use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use tracing::{debug, trace};

/// Matches `http(s)://drive.google.com/uc?id=...` links.
#[allow(clippy::expect_used)]
static DRIVE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/uc\?id=.*$").expect("Drive URL regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static DOWNLOAD_HREF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="(/uc\?export=download[^"]+)"#).expect("download href regex is valid")
});

#[allow(clippy::expect_used)]
static CONFIRM_TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"confirm=([^;&]+)").expect("confirm token regex is valid")
});

#[allow(clippy::expect_used)]
static DOWNLOAD_URL_FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""downloadUrl":"([^"]+)"#).expect("downloadUrl field regex is valid")
});

/// Returns true if `url` is a Google Drive `uc?id=` link.
///
/// # Examples
///
/// ```
/// use gdfetch_core::is_google_drive_url;
///
/// assert!(is_google_drive_url("https://drive.google.com/uc?id=0B9P1L"));
/// assert!(!is_google_drive_url("https://drive.google.com/file/d/0B9P1L/view"));
/// ```
#[must_use]
pub fn is_google_drive_url(url: &str) -> bool {
    DRIVE_URL_PATTERN.is_match(url)
}

/// A continuation scraped from a confirmation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Absolute URL built from a `/uc?export=download` anchor.
    DownloadLink(String),
    /// A `confirm=` token applied to the candidate URL.
    ///
    /// The candidate is empty unless an earlier pattern produced one, so the
    /// rewritten `url` is usually empty as well.
    ConfirmToken {
        /// The token value.
        token: String,
        /// The candidate URL after substitution.
        url: String,
    },
    /// Unescaped value of a `"downloadUrl"` JSON field.
    DownloadUrlField(String),
}

impl Continuation {
    /// The URL to request next. May be empty for [`Continuation::ConfirmToken`].
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::DownloadLink(url)
            | Self::DownloadUrlField(url)
            | Self::ConfirmToken { url, .. } => url,
        }
    }

    /// Short label for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DownloadLink(_) => "download_link",
            Self::ConfirmToken { .. } => "confirm_token",
            Self::DownloadUrlField(_) => "download_url_field",
        }
    }

    /// Consumes the continuation, returning the next URL.
    #[must_use]
    pub fn into_url(self) -> String {
        match self {
            Self::DownloadLink(url)
            | Self::DownloadUrlField(url)
            | Self::ConfirmToken { url, .. } => url,
        }
    }
}

/// Scans a confirmation page for the next URL to request.
///
/// Lines are scanned in order and the first line matching any pattern wins.
/// `docs_host` is prefixed to relative `/uc?export=download` anchors
/// (normally `https://docs.google.com`).
///
/// Returns `None` when no line matches.
///
/// # Examples
///
/// ```
/// use gdfetch_core::{Continuation, find_continuation};
///
/// let page = r#"<a id="uc-download-link" href="/uc?export=download&amp;confirm=Xy&amp;id=42">"#;
/// let next = find_continuation(page, "https://docs.google.com").unwrap();
/// assert_eq!(
///     next,
///     Continuation::DownloadLink(
///         "https://docs.google.com/uc?export=download&confirm=Xy&id=42".to_string()
///     )
/// );
/// ```
#[must_use]
#[tracing::instrument(skip(body), fields(body_len = body.len()))]
pub fn find_continuation(body: &str, docs_host: &str) -> Option<Continuation> {
    let candidate = String::new();

    for (index, line) in page_lines(body).into_iter().enumerate() {
        if let Some(caps) = DOWNLOAD_HREF_PATTERN.captures(line) {
            let url = format!("{docs_host}{}", &caps[1]).replace("&amp;", "&");
            debug!(line = index + 1, url = %url, "found download link");
            return Some(Continuation::DownloadLink(url));
        }

        if let Some(caps) = CONFIRM_TOKEN_PATTERN.captures(line) {
            let token = caps[1].to_string();
            let replacement = format!("confirm={token}");
            let url = CONFIRM_TOKEN_PATTERN
                .replace_all(&candidate, NoExpand(&replacement))
                .into_owned();
            debug!(line = index + 1, token = %token, url = %url, "found confirm token");
            return Some(Continuation::ConfirmToken { token, url });
        }

        if let Some(caps) = DOWNLOAD_URL_FIELD_PATTERN.captures(line) {
            let url = unescape_json_string(&caps[1]);
            debug!(line = index + 1, url = %url, "found downloadUrl field");
            return Some(Continuation::DownloadUrlField(url));
        }
    }

    trace!("no continuation pattern matched");
    None
}

/// Splits a page into lines on every line boundary it may use.
///
/// Besides `\n` and `\r\n` this includes a bare `\r`, vertical tab, form
/// feed, the file/group/record separators, NEL and the Unicode line and
/// paragraph separators. A trailing boundary does not produce an empty line.
fn page_lines(body: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = body.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        if !is_line_boundary(c) {
            continue;
        }
        lines.push(&body[start..index]);
        start = index + c.len_utf8();
        if c == '\r'
            && let Some(&(next_index, '\n')) = chars.peek()
        {
            chars.next();
            start = next_index + 1;
        }
    }

    if start < body.len() {
        lines.push(&body[start..]);
    }
    lines
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}'
    )
}

/// Decodes a JSON string body (without surrounding quotes).
///
/// Falls back to replacing the `=` and `&` escapes Drive emits when the
/// value is not valid JSON.
fn unescape_json_string(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|e| {
        debug!(error = %e, "downloadUrl is not a valid JSON string, unescaping manually");
        raw.replace("\\u003d", "=").replace("\\u0026", "&")
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DOCS: &str = "https://docs.google.com";

    #[test]
    fn test_is_google_drive_url_accepts_uc_id_links() {
        assert!(is_google_drive_url("https://drive.google.com/uc?id=0B9P1L--7Wd2vNm9zMTJWOGxobkU"));
        assert!(is_google_drive_url("http://drive.google.com/uc?id=abc"));
        assert!(is_google_drive_url("https://drive.google.com/uc?id="));
    }

    #[test]
    fn test_is_google_drive_url_rejects_other_shapes() {
        assert!(!is_google_drive_url("https://drive.google.com/uc?export=download&id=abc"));
        assert!(!is_google_drive_url("https://drive.google.com/file/d/abc/view"));
        assert!(!is_google_drive_url("https://docs.google.com/uc?id=abc"));
        assert!(!is_google_drive_url("ftp://drive.google.com/uc?id=abc"));
        assert!(!is_google_drive_url("https://example.com/file.zip"));
        assert!(!is_google_drive_url(" https://drive.google.com/uc?id=abc"));
    }

    #[test]
    fn test_is_google_drive_url_host_dots_are_literal() {
        assert!(!is_google_drive_url("https://driveXgoogleXcom/uc?id=abc"));
    }

    #[test]
    fn test_find_continuation_download_link_unescapes_ampersands() {
        let page = "<html>\n<a href=\"/uc?export=download&amp;confirm=jA1b&amp;id=X\">Download anyway</a>\n</html>";
        let next = find_continuation(page, DOCS).unwrap();
        assert_eq!(
            next,
            Continuation::DownloadLink(
                "https://docs.google.com/uc?export=download&confirm=jA1b&id=X".to_string()
            )
        );
        assert_eq!(next.kind(), "download_link");
    }

    #[test]
    fn test_find_continuation_download_link_uses_docs_host() {
        let page = r#"<a href="/uc?export=download&id=X">"#;
        let next = find_continuation(page, "http://127.0.0.1:8080").unwrap();
        assert_eq!(next.url(), "http://127.0.0.1:8080/uc?export=download&id=X");
    }

    #[test]
    fn test_find_continuation_download_url_field_resolves_escapes() {
        let page = r#"{"downloadUrl":"https:\/\/host\/path?a\u003d1\u0026b\u003d2","sizeBytes":"12"}"#;
        let next = find_continuation(page, DOCS).unwrap();
        assert_eq!(
            next,
            Continuation::DownloadUrlField("https://host/path?a=1&b=2".to_string())
        );
    }

    #[test]
    fn test_find_continuation_download_url_field_invalid_json_falls_back() {
        // Trailing lone backslash is not a valid JSON string.
        let page = r#""downloadUrl":"https://host/p?a\u003d1\u0026b\"#;
        let next = find_continuation(page, DOCS).unwrap();
        assert_eq!(next.url(), "https://host/p?a=1&b\\");
    }

    #[test]
    fn test_find_continuation_confirm_token_without_candidate_is_empty() {
        let page = "<form action=\"/download?id=X&confirm=t0k3n;more\">";
        let next = find_continuation(page, DOCS).unwrap();
        assert_eq!(
            next,
            Continuation::ConfirmToken {
                token: "t0k3n".to_string(),
                url: String::new(),
            }
        );
        assert!(next.url().is_empty());
    }

    #[test]
    fn test_find_continuation_token_stops_at_ampersand() {
        let page = "confirm=abc&id=1";
        let Some(Continuation::ConfirmToken { token, .. }) = find_continuation(page, DOCS) else {
            panic!("expected confirm token");
        };
        assert_eq!(token, "abc");
    }

    #[test]
    fn test_find_continuation_href_wins_over_confirm_on_same_line() {
        let page = r#"<a href="/uc?export=download&amp;confirm=AbC&amp;id=X">"#;
        let next = find_continuation(page, DOCS).unwrap();
        assert_eq!(next.kind(), "download_link");
    }

    #[test]
    fn test_find_continuation_earlier_line_wins() {
        let page = "var confirm=first;\n<a href=\"/uc?export=download&id=X\">";
        let next = find_continuation(page, DOCS).unwrap();
        assert_eq!(next.kind(), "confirm_token");
    }

    #[test]
    fn test_find_continuation_no_match_returns_none() {
        let page = "<html><body>You need permission</body></html>";
        assert!(find_continuation(page, DOCS).is_none());
        assert!(find_continuation("", DOCS).is_none());
    }

    #[test]
    fn test_continuation_into_url() {
        let next = Continuation::DownloadUrlField("https://host/x".to_string());
        assert_eq!(next.into_url(), "https://host/x");
    }

    #[test]
    fn test_page_lines_splits_on_every_boundary() {
        let body = "a\r\nb\rc\nd\u{0c}e\u{2028}f\u{85}g\n";
        assert_eq!(page_lines(body), vec!["a", "b", "c", "d", "e", "f", "g"]);
        assert!(page_lines("").is_empty());
        assert_eq!(page_lines("\n\n"), vec!["", ""]);
    }

    #[test]
    fn test_find_continuation_bare_carriage_return_separates_lines() {
        let page = "var confirm=abc;\r<a href=\"/uc?export=download&amp;id=X\">";
        let next = find_continuation(page, DOCS).unwrap();
        assert_eq!(next.kind(), "confirm_token");
        assert!(next.url().is_empty());
    }
}
