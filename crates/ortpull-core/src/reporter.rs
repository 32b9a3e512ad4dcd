//! Reporter trait for dependency injection
//!
//! This trait allows the pipeline to narrate progress and failures without
//! being coupled to a specific terminal implementation.

use ortpull_schema::PlatformTarget;

/// Progress sink for a pipeline run.
pub trait Reporter: Send + Sync {
    /// Indicates a new platform has started processing.
    fn section(&self, title: &str);

    /// Updates the progress of a download.
    fn downloading(&self, target: &PlatformTarget, current: u64, total: Option<u64>);

    /// Indicates extraction of a downloaded archive has started.
    fn extracting(&self, target: &PlatformTarget);

    /// Indicates the payload is being republished into the output tree.
    fn organizing(&self, target: &PlatformTarget);

    /// Marks a platform as fully published.
    fn done(&self, target: &PlatformTarget, detail: &str);

    /// Marks a platform as failed with a specific reason.
    fn failed(&self, target: &PlatformTarget, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);

    /// Display the final tally.
    fn summary(&self, succeeded: usize, requested: usize);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn downloading(&self, target: &PlatformTarget, current: u64, total: Option<u64>) {
        (**self).downloading(target, current, total);
    }
    fn extracting(&self, target: &PlatformTarget) {
        (**self).extracting(target);
    }
    fn organizing(&self, target: &PlatformTarget) {
        (**self).organizing(target);
    }
    fn done(&self, target: &PlatformTarget, detail: &str) {
        (**self).done(target, detail);
    }
    fn failed(&self, target: &PlatformTarget, reason: &str) {
        (**self).failed(target, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
    fn summary(&self, succeeded: usize, requested: usize) {
        (**self).summary(succeeded, requested);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn downloading(&self, _: &PlatformTarget, _: u64, _: Option<u64>) {}
    fn extracting(&self, _: &PlatformTarget) {}
    fn organizing(&self, _: &PlatformTarget) {}
    fn done(&self, _: &PlatformTarget, _: &str) {}
    fn failed(&self, _: &PlatformTarget, _: &str) {}
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
    fn summary(&self, _: usize, _: usize) {}
}
