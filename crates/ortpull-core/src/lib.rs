//! ortpull core: fetch upstream ONNX Runtime release archives and publish
//! them into a per-platform tree for native-interop builds.
//!
//! # Directory Layout
//!
//! ```text
//! {output_dir}/
//! ├── amd64_windows/
//! │   ├── include/
//! │   └── onnxruntime.dll
//! ├── arm64_darwin/
//! │   ├── include/
//! │   └── libonnxruntime.dylib
//! └── temp_onnx_download/   # scratch, removed after every run
//! ```

pub mod config;
pub mod io;
pub mod job;
pub mod organize;
pub mod pipeline;
pub mod registry;
pub mod reporter;

pub use config::{LayoutOptions, PipelineConfig};
pub use pipeline::{JobError, Pipeline, RunSummary, SetupError};
pub use reporter::{NullReporter, Reporter};

/// User Agent string for upstream requests
pub const USER_AGENT: &str = concat!("ortpull/", env!("CARGO_PKG_VERSION"));
