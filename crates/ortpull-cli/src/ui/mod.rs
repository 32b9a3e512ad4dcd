//! Terminal output.

pub mod table;
pub mod theme;

use std::sync::Mutex;

use crossterm::style::Stylize;
use ortpull_core::Reporter;
use ortpull_schema::PlatformTarget;

use theme::{Theme, format_size};

/// Bytes between progress lines when the server sends no length.
const UNSIZED_STEP: u64 = 16 * 1024 * 1024;

/// [`Reporter`] that narrates a run on stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    theme: Theme,
    /// Last progress bucket printed for the current download.
    last_bucket: Mutex<Option<u64>>,
}

impl ConsoleReporter {
    /// Create a reporter with the default theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `bucket` has not been printed yet; records it if so.
    fn advance_bucket(&self, bucket: u64) -> bool {
        let Ok(mut last) = self.last_bucket.lock() else {
            return false;
        };
        if last.is_some_and(|l| l >= bucket) {
            return false;
        }
        *last = Some(bucket);
        true
    }

    fn reset_progress(&self) {
        if let Ok(mut last) = self.last_bucket.lock() {
            *last = None;
        }
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        self.reset_progress();
        println!();
        println!("{}", title.with(self.theme.header).bold());
    }

    fn downloading(&self, target: &PlatformTarget, current: u64, total: Option<u64>) {
        let line = match total {
            Some(total) if total > 0 => {
                let percent = current.saturating_mul(100) / total;
                if !self.advance_bucket(percent / 10) {
                    return;
                }
                format!(
                    "{} / {} ({percent}%)",
                    format_size(current),
                    format_size(total)
                )
            }
            _ => {
                if !self.advance_bucket(current / UNSIZED_STEP) {
                    return;
                }
                format_size(current)
            }
        };
        println!(
            "  {} {} {}",
            self.theme.icons.active.with(self.theme.active),
            target.to_string().with(self.theme.target),
            format!("downloading {line}").with(self.theme.secondary)
        );
    }

    fn extracting(&self, target: &PlatformTarget) {
        println!(
            "  {} {} {}",
            self.theme.icons.active.with(self.theme.active),
            target.to_string().with(self.theme.target),
            "extracting".with(self.theme.secondary)
        );
    }

    fn organizing(&self, target: &PlatformTarget) {
        println!(
            "  {} {} {}",
            self.theme.icons.active.with(self.theme.active),
            target.to_string().with(self.theme.target),
            "organizing".with(self.theme.secondary)
        );
    }

    fn done(&self, target: &PlatformTarget, detail: &str) {
        println!(
            "  {} {} {}",
            self.theme.icons.success.with(self.theme.success),
            target.to_string().with(self.theme.target),
            detail.with(self.theme.secondary)
        );
    }

    fn failed(&self, target: &PlatformTarget, reason: &str) {
        println!(
            "  {} {} {}",
            self.theme.icons.error.with(self.theme.error),
            target.to_string().with(self.theme.target),
            reason.with(self.theme.error)
        );
        println!("    Skipping {target}.");
    }

    fn info(&self, msg: &str) {
        println!(
            "  {} {}",
            self.theme.icons.info.with(self.theme.secondary),
            msg
        );
    }

    fn warning(&self, msg: &str) {
        println!(
            "  {} {}",
            self.theme.icons.warning.with(self.theme.warning),
            msg.with(self.theme.warning)
        );
    }

    fn error(&self, msg: &str) {
        eprintln!(
            "  {} {}",
            self.theme.icons.error.with(self.theme.error),
            msg.with(self.theme.error)
        );
    }

    fn summary(&self, succeeded: usize, requested: usize) {
        let color = if succeeded == requested {
            self.theme.success
        } else {
            self.theme.warning
        };
        println!();
        println!(
            "{}",
            format!("Successfully processed {succeeded}/{requested} requested platform(s)")
                .with(color)
                .bold()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_buckets_only_advance() {
        let reporter = ConsoleReporter::new();
        assert!(reporter.advance_bucket(0));
        assert!(!reporter.advance_bucket(0));
        assert!(reporter.advance_bucket(3));
        assert!(!reporter.advance_bucket(2));

        reporter.reset_progress();
        assert!(reporter.advance_bucket(0));
    }
}
