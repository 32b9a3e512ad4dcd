//! Default command: download and publish platforms.

use anyhow::{Context, Result};
use ortpull_core::{Pipeline, PipelineConfig};

use crate::Cli;
use crate::ui::ConsoleReporter;

/// Build the effective config: file and environment first, flags last.
pub fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    if let Some(v) = &cli.ort_version {
        config.version.clone_from(v);
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir.clone_from(dir);
    }
    if let Some(url) = &cli.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(dir) = &cli.temp_dir {
        config.temp_dir = Some(dir.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout_secs = secs;
    }
    if cli.no_flatten {
        config.layout.flatten_libraries = false;
    }
    Ok(config)
}

/// Run the pipeline for the selected platforms.
///
/// Returns whether every requested platform resolved and was published.
/// Per-platform failures are reported, never returned as errors.
pub async fn fetch(cli: &Cli) -> Result<bool> {
    let config = resolve_config(cli)?;
    tracing::debug!(?config, "resolved configuration");

    let pipeline =
        Pipeline::new(config, ConsoleReporter::new()).context("Failed to set up pipeline")?;
    let summary = pipeline.run(None, cli.platforms.as_deref()).await;

    Ok(summary.is_complete())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "ortpull",
            "--ort-version",
            "1.18.0",
            "-o",
            "/tmp/ort",
            "--base-url",
            "http://mirror.local/releases",
            "--timeout-secs",
            "5",
            "--no-flatten",
        ]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.version, "1.18.0");
        assert_eq!(config.output_dir, Path::new("/tmp/ort"));
        assert_eq!(config.base_url, "http://mirror.local/releases");
        assert_eq!(config.timeout_secs, 5);
        assert!(!config.layout.flatten_libraries);
        assert_eq!(config.temp_root(), Path::new("/tmp/ort/temp_onnx_download"));
    }

    #[test]
    fn test_platforms_take_multiple_values() {
        let cli = Cli::parse_from(["ortpull", "-p", "linux-amd64", "darwin-arm64"]);
        assert_eq!(
            cli.platforms.as_deref(),
            Some(["linux-amd64".to_string(), "darwin-arm64".to_string()].as_slice())
        );
    }

    #[test]
    fn test_config_file_is_layered_under_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ortpull.toml");
        std::fs::write(
            &path,
            "version = \"1.16.0\"\ntimeout_secs = 42\n[layout]\nflatten_libraries = false\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "ortpull",
            "--config",
            path.to_str().unwrap(),
            "--timeout-secs",
            "7",
        ]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.timeout_secs, 7);
        assert!(!config.layout.flatten_libraries);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["ortpull", "--config", "/definitely/not/here.toml"]);
        assert!(resolve_config(&cli).is_err());
    }
}
