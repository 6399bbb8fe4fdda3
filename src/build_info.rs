//! Build-time version information for `--version`.

use std::fmt;
use std::path::{Path, PathBuf};

/// Immutable program identity, captured once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Program name.
    pub name: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Directory holding the running executable, when it can be determined.
    pub location: Option<PathBuf>,
}

impl BuildInfo {
    /// Captures build constants and the running executable's directory.
    #[must_use]
    pub fn current() -> Self {
        let location = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            location,
        }
    }
}

/// Formats as `<name> <version> at <location>`.
impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} {} at {}", self.name, self.version, location.display()),
            None => write!(f, "{} {} at <unknown>", self.name, self.version),
        }
    }
}
