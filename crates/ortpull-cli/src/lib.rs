//! ortpull - fetch ONNX Runtime release payloads
#![allow(clippy::missing_errors_doc)]
//!
//! Downloads the upstream release archive for each selected platform,
//! unpacks it and republishes headers and libraries under
//! `{output_dir}/{arch}_{os}` so native-interop builds can link against a
//! stable layout.

pub mod cmd;
pub mod ui;

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "ortpull")]
#[command(
    author,
    version,
    about = "Fetch ONNX Runtime release payloads into a per-platform tree"
)]
pub struct Cli {
    /// Platforms to fetch as os-arch (e.g. linux-amd64). Defaults to all.
    #[arg(short, long, num_args = 1.., value_name = "OS-ARCH")]
    pub platforms: Option<Vec<String>>,

    /// ONNX Runtime release version
    #[arg(long, value_name = "VERSION")]
    pub ort_version: Option<String>,

    /// Root of the published tree
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Release download root
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Parent directory for the run's temp_onnx_download scratch space
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// HTTP timeout per archive, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// TOML config file
    #[arg(short, long, value_name = "FILE", env = "ORTPULL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Keep libraries under a nested lib/ directory
    #[arg(long)]
    pub no_flatten: bool,

    /// Exit with status 1 unless every requested platform was published
    #[arg(long)]
    pub strict: bool,

    /// Print the supported platforms and exit
    #[arg(long, conflicts_with = "platforms")]
    pub list: bool,
}
