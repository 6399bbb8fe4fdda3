//! Byte-scaled transfer progress (indicatif).

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const COUNTER_TEMPLATE: &str = "{spinner} {bytes} ({bytes_per_sec})";

/// Progress indicator for one transfer.
///
/// Quiet transfers carry no bar at all. Otherwise a bar is shown when the
/// total length is known, and a running byte counter when it is not.
#[derive(Debug)]
pub(crate) struct TransferProgress {
    bar: Option<ProgressBar>,
}

impl TransferProgress {
    pub(crate) fn new(quiet: bool, total: Option<u64>) -> Self {
        if quiet {
            return Self { bar: None };
        }

        let bar = match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                bar.set_style(
                    ProgressStyle::with_template(BAR_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                bar
            }
            None => {
                let bar = ProgressBar::no_length();
                bar.set_style(
                    ProgressStyle::with_template(COUNTER_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            }
        };
        Self { bar: Some(bar) }
    }

    pub(crate) fn advance(&self, bytes: usize) {
        if let Some(bar) = &self.bar {
            bar.inc(bytes as u64);
        }
    }

    /// Closes the indicator, leaving the final state on screen.
    pub(crate) fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish();
        }
    }

    #[cfg(test)]
    fn position(&self) -> Option<u64> {
        self.bar.as_ref().map(ProgressBar::position)
    }

    #[cfg(test)]
    fn length(&self) -> Option<u64> {
        self.bar.as_ref().and_then(ProgressBar::length)
    }
}
