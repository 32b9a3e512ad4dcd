//! Pipeline orchestration.
//!
//! Drives every selected platform through download, extraction and
//! publishing, one at a time and in resolution order:
//!
//! ```text
//! FetchJob::Pending --[download]--> Fetched --[extract]--> Extracted --[organize]--> Organized
//! ```
//!
//! A failing stage abandons that platform only. The shared scratch root is
//! created before the first job and removed after the last one whatever the
//! outcomes were.

use std::path::{Path, PathBuf};

use ortpull_schema::{PlatformTarget, REGISTRY};
use reqwest::Client;
use thiserror::Error;

use crate::Reporter;
use crate::config::{ConfigError, PipelineConfig};
use crate::io::download::{DownloadError, DownloadRequest, build_client};
use crate::io::extract::{ExtractError, extract_archive};
use crate::job::{FetchJob, JobState, Stage};
use crate::organize::{OrganizeError, OrganizeReport, organize};
use crate::registry::{Rejected, targets_for};

/// Any failure that abandons a single platform.
#[derive(Error, Debug)]
pub enum JobError {
    /// Fetch stage.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Extract stage, including resetting the extraction directory.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Organize stage.
    #[error(transparent)]
    Organize(#[from] OrganizeError),

    /// A blocking stage panicked or was cancelled.
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failures that prevent a pipeline from being built at all.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Settings are unsafe to run with.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be constructed.
    #[error(transparent)]
    Client(#[from] DownloadError),
}

/// Terminal result of one job.
#[derive(Debug)]
pub struct JobOutcome {
    /// Platform processed.
    pub target: PlatformTarget,
    /// Where output was (or would have been) published.
    pub publish_path: PathBuf,
    /// Final state; always terminal.
    pub state: JobState,
    /// Files unpacked from the archive; zero if extraction never finished.
    pub extracted_files: usize,
    /// Publish details on success, the stage error on failure.
    pub result: Result<OrganizeReport, JobError>,
}

/// Aggregate result of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Jobs that reached [`JobState::Organized`].
    pub succeeded: usize,
    /// Jobs attempted (resolved selectors).
    pub requested: usize,
    /// Selectors that did not resolve to a job.
    pub rejected: Vec<Rejected>,
    /// Per-job outcomes, in processing order.
    pub outcomes: Vec<JobOutcome>,
}

impl RunSummary {
    /// Every requested platform resolved and published.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty() && self.succeeded == self.requested
    }

    /// Stages that failed, by platform, in processing order.
    pub fn failures(&self) -> impl Iterator<Item = (&PlatformTarget, Stage)> {
        self.outcomes.iter().filter_map(|o| match o.state {
            JobState::Failed { stage } => Some((&o.target, stage)),
            _ => None,
        })
    }
}

/// Sequential fetch/extract/publish driver.
#[derive(Debug)]
pub struct Pipeline<R: Reporter> {
    config: PipelineConfig,
    client: Client,
    reporter: R,
}

impl<R: Reporter> Pipeline<R> {
    /// Create a pipeline with its own HTTP client.
    ///
    /// Fails if the scratch root would contain the output tree, since the
    /// scratch root is removed at the end of every run.
    pub fn new(config: PipelineConfig, reporter: R) -> Result<Self, SetupError> {
        config.validate()?;
        let client = build_client(config.timeout())?;
        Ok(Self {
            config,
            client,
            reporter,
        })
    }

    /// Settings this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process `selection` (or every registered platform) at `version`
    /// (or the configured version).
    ///
    /// Never fails as a whole: per-platform errors are reported and counted.
    pub async fn run(&self, version: Option<&str>, selection: Option<&[String]>) -> RunSummary {
        let version = version.unwrap_or(&self.config.version).to_string();
        let resolution = targets_for(REGISTRY, selection, &version);

        for rejected in &resolution.rejected {
            self.reporter
                .warning(&format!("{}. Skipping.", rejected.reason));
        }

        let temp_root = self.config.temp_root();
        if let Err(e) = std::fs::create_dir_all(&temp_root) {
            tracing::error!(path = %temp_root.display(), error = %e, "cannot create temp root");
            self.reporter.error(&format!(
                "Could not create temporary directory {}: {e}",
                temp_root.display()
            ));
        }

        let mut summary = RunSummary {
            requested: resolution.specs.len(),
            rejected: resolution.rejected,
            ..RunSummary::default()
        };

        for spec in resolution.specs {
            let mut job = FetchJob::new(spec, &version, &self.config);
            let outcome = self.run_job(&mut job).await;
            if outcome.result.is_ok() {
                summary.succeeded += 1;
            }
            summary.outcomes.push(outcome);
        }

        self.cleanup(&temp_root);
        self.reporter.summary(summary.succeeded, summary.requested);
        summary
    }

    async fn run_job(&self, job: &mut FetchJob) -> JobOutcome {
        self.reporter.section(&format!(
            "Processing: {} (upstream: {})",
            job.target,
            job.target.archive_tuple()
        ));

        let result = match self.process(job).await {
            Ok(report) => {
                if report.libraries.is_empty() {
                    self.reporter.warning(&format!(
                        "No library files found in {}",
                        report.payload_root.join("lib").display()
                    ));
                }
                self.reporter.done(
                    &job.target,
                    &format!(
                        "{} file(s) extracted, {} header(s), {} librar{} at {}",
                        job.extracted_files,
                        report.header_files,
                        report.libraries.len(),
                        if report.libraries.len() == 1 { "y" } else { "ies" },
                        job.publish_path.display()
                    ),
                );
                Ok(report)
            }
            Err(e) => {
                let stage = job.fail();
                tracing::error!(
                    platform = %job.target,
                    url = %job.url,
                    archive = %job.archive_path.display(),
                    %stage,
                    error = %e,
                    "job failed"
                );
                self.reporter.failed(&job.target, &format!("{stage} failed: {e}"));
                Err(e)
            }
        };

        JobOutcome {
            target: job.target,
            publish_path: job.publish_path.clone(),
            state: job.state,
            extracted_files: job.extracted_files,
            result,
        }
    }

    async fn process(&self, job: &mut FetchJob) -> Result<OrganizeReport, JobError> {
        DownloadRequest {
            client: &self.client,
            target: &job.target,
            url: &job.url,
            dest: &job.archive_path,
            chunk_size: self.config.chunk_size,
            reporter: &self.reporter,
        }
        .execute()
        .await?;
        job.advance();

        self.reporter.extracting(&job.target);
        let archive = job.archive_path.clone();
        let extract_path = job.extract_path.clone();
        let extracted = tokio::task::spawn_blocking(move || {
            reset_dir(&extract_path)?;
            extract_archive(&archive, &extract_path)
        })
        .await??;
        job.extracted_files = extracted.len();
        tracing::debug!(
            platform = %job.target,
            files = extracted.len(),
            "archive unpacked"
        );
        job.advance();

        self.reporter.organizing(&job.target);
        let extract_path = job.extract_path.clone();
        let publish_path = job.publish_path.clone();
        let target = job.target;
        let layout = self.config.layout.clone();
        let report = tokio::task::spawn_blocking(move || {
            organize(
                &extract_path,
                &publish_path,
                target.archive_os,
                target.archive_arch,
                &layout,
            )
        })
        .await??;
        job.advance();

        Ok(report)
    }

    fn cleanup(&self, temp_root: &Path) {
        if !temp_root.exists() {
            return;
        }
        match std::fs::remove_dir_all(temp_root) {
            Ok(()) => self.reporter.info(&format!(
                "Cleaned up temporary directory: {}",
                temp_root.display()
            )),
            Err(e) => {
                tracing::warn!(path = %temp_root.display(), error = %e, "temp cleanup failed");
                self.reporter.warning(&format!(
                    "Could not clean up temporary directory {}: {e}",
                    temp_root.display()
                ));
            }
        }
    }
}

/// Delete and recreate a job's extraction directory.
fn reset_dir(dir: &Path) -> Result<(), ExtractError> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}
