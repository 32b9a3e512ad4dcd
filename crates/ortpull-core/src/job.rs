//! Per-platform units of work.

use std::path::{Path, PathBuf};

use ortpull_schema::PlatformTarget;

use crate::config::PipelineConfig;
use crate::registry::JobSpec;

/// Stage a job failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Downloading the archive.
    Fetch,
    /// Unpacking the archive.
    Extract,
    /// Publishing into the target tree.
    Organize,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Fetch => "download",
            Self::Extract => "extract",
            Self::Organize => "organize",
        })
    }
}

/// Lifecycle of a job.
///
/// ```text
/// Pending -> Fetched -> Extracted -> Organized
///    \__________\___________\______> Failed { stage }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Created, nothing done yet.
    Pending,
    /// Archive is on disk.
    Fetched,
    /// Archive is unpacked.
    Extracted,
    /// Published. Terminal.
    Organized,
    /// Abandoned. Terminal.
    Failed {
        /// Stage that failed.
        stage: Stage,
    },
}

impl JobState {
    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Organized | Self::Failed { .. })
    }

    /// Stage the next transition runs.
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            Self::Pending => Some(Stage::Fetch),
            Self::Fetched => Some(Stage::Extract),
            Self::Extracted => Some(Stage::Organize),
            Self::Organized | Self::Failed { .. } => None,
        }
    }
}

/// Scratch directory a job extracts into, unique per upstream tuple.
pub fn extract_dir_for(temp_root: &Path, target: &PlatformTarget) -> PathBuf {
    temp_root.join(format!(
        "extracted_{}_{}",
        target.archive_os, target.archive_arch
    ))
}

/// A resolved platform plus everything needed to process it.
#[derive(Debug, Clone)]
pub struct FetchJob {
    /// Registry row.
    pub target: PlatformTarget,
    /// Release version.
    pub version: String,
    /// Archive file name with the version substituted.
    pub archive_filename: String,
    /// Download URL.
    pub url: String,
    /// Where the archive is downloaded to.
    pub archive_path: PathBuf,
    /// Where the archive is unpacked.
    pub extract_path: PathBuf,
    /// `{output_dir}/{target_arch}_{target_os}`.
    pub publish_path: PathBuf,
    /// Number of files the archive unpacked to.
    pub extracted_files: usize,
    /// Current lifecycle state.
    pub state: JobState,
}

impl FetchJob {
    /// Bind a [`JobSpec`] to the paths and URL derived from `config`.
    pub fn new(spec: JobSpec, version: &str, config: &PipelineConfig) -> Self {
        let temp_root = config.temp_root();
        Self {
            url: config.release_url(version, &spec.archive_filename),
            archive_path: temp_root.join(&spec.archive_filename),
            extract_path: extract_dir_for(&temp_root, &spec.target),
            publish_path: config.output_dir.join(spec.target.publish_dir_name()),
            target: spec.target,
            version: version.to_string(),
            archive_filename: spec.archive_filename,
            extracted_files: 0,
            state: JobState::Pending,
        }
    }

    /// Record a completed stage.
    pub fn advance(&mut self) {
        self.state = match self.state {
            JobState::Pending => JobState::Fetched,
            JobState::Fetched => JobState::Extracted,
            JobState::Extracted => JobState::Organized,
            terminal => terminal,
        };
    }

    /// Record a failure in the stage currently running.
    pub fn fail(&mut self) -> Stage {
        let stage = self.state.next_stage().unwrap_or(Stage::Organize);
        if !self.state.is_terminal() {
            self.state = JobState::Failed { stage };
        }
        stage
    }
}
