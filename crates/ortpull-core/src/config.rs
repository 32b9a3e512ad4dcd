//! Pipeline configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `ORTPULL_*` environment variables. The CLI applies its own flags last.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use ortpull_schema::{DEFAULT_ORT_VERSION, PAYLOAD_STEM};
use serde::Deserialize;
use thiserror::Error;

/// Upstream release download root.
pub const DEFAULT_BASE_URL: &str = "https://github.com/microsoft/onnxruntime/releases/download";

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "onnxruntime";

/// Name of the scratch directory created under the output root.
pub const TEMP_DIR_NAME: &str = "temp_onnx_download";

/// Errors raised while assembling a [`PipelineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },

    /// An environment override did not parse.
    #[error("invalid value for {key}: {value}")]
    InvalidEnv {
        /// Variable name.
        key: &'static str,
        /// Value as found.
        value: String,
    },

    /// The scratch root would be deleted together with published output.
    #[error(
        "temporary directory {} overlaps output directory {}",
        .temp_root.display(),
        .output_dir.display()
    )]
    TempRootOverlapsOutput {
        /// Scratch root, made absolute.
        temp_root: PathBuf,
        /// Output root, made absolute.
        output_dir: PathBuf,
    },
}

/// How a payload is republished into the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Stem of payload directory names and library file names.
    pub payload_stem: String,
    /// Copy library files to the publish root instead of a nested `lib/`.
    ///
    /// cgo-style consumers look for libraries next to `include/`, so this is
    /// on by default.
    pub flatten_libraries: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            payload_stem: PAYLOAD_STEM.to_string(),
            flatten_libraries: true,
        }
    }
}

impl LayoutOptions {
    /// Prefix a payload directory must start with for the given upstream tuple.
    pub fn payload_prefix(&self, archive_os: &str, archive_arch: &str) -> String {
        format!("{}-{archive_os}-{archive_arch}", self.payload_stem)
    }

    /// File name prefixes that identify library files (`onnxruntime.` and `libonnxruntime.`).
    pub fn library_prefixes(&self) -> [String; 2] {
        [
            format!("{}.", self.payload_stem),
            format!("lib{}.", self.payload_stem),
        ]
    }

    /// Whether `name` follows either library naming convention.
    pub fn is_library_name(&self, name: &str) -> bool {
        self.library_prefixes()
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Release version to fetch.
    pub version: String,
    /// Download root; URLs are `{base_url}/v{version}/{file}`.
    pub base_url: String,
    /// Root of the canonical target tree.
    pub output_dir: PathBuf,
    /// Parent of the scratch root. Defaults to `output_dir`.
    ///
    /// The run only ever creates and removes its own
    /// `temp_onnx_download` child here, never the directory itself.
    pub temp_dir: Option<PathBuf>,
    /// HTTP connect timeout, and the longest wait allowed for any single
    /// read of the response body. The transfer as a whole is unbounded.
    pub timeout_secs: u64,
    /// Write buffer size for streamed downloads.
    pub chunk_size: usize,
    /// Output layout options.
    pub layout: LayoutOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_ORT_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            temp_dir: None,
            timeout_secs: 300,
            chunk_size: 8192,
            layout: LayoutOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents, path)
    }

    /// Defaults (or `path`, if given), overlaid with the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay `ORTPULL_*` variables read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("ORTPULL_VERSION") {
            self.version = v;
        }
        if let Some(v) = lookup("ORTPULL_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("ORTPULL_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("ORTPULL_TEMP_DIR") {
            self.temp_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("ORTPULL_TIMEOUT_SECS") {
            self.timeout_secs = v.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "ORTPULL_TIMEOUT_SECS",
                value: v.clone(),
            })?;
        }
        Ok(())
    }

    /// Scratch root shared by every job in a run, removed when it ends.
    pub fn temp_root(&self) -> PathBuf {
        self.temp_dir
            .as_deref()
            .unwrap_or(&self.output_dir)
            .join(TEMP_DIR_NAME)
    }

    /// Reject settings under which cleanup could remove published output.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let temp_root = absolute(&self.temp_root());
        let output_dir = absolute(&self.output_dir);
        if output_dir.starts_with(&temp_root) {
            return Err(ConfigError::TempRootOverlapsOutput {
                temp_root,
                output_dir,
            });
        }
        Ok(())
    }

    /// Connect and per-read timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Download URL for an archive of `version`.
    pub fn release_url(&self, version: &str, filename: &str) -> String {
        format!(
            "{}/v{version}/{filename}",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// Lexically absolute form of `path`, with `.` and `..` folded.
fn absolute(path: &Path) -> PathBuf {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.version, DEFAULT_ORT_VERSION);
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert_eq!(
            config.temp_root(),
            Path::new("onnxruntime").join("temp_onnx_download")
        );
        assert!(config.layout.flatten_libraries);
    }

    #[test]
    fn test_release_url() {
        let config = PipelineConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.release_url("1.21.0", "onnxruntime-linux-x64-1.21.0.tgz"),
            "http://127.0.0.1:8080/v1.21.0/onnxruntime-linux-x64-1.21.0.tgz"
        );

        let default = PipelineConfig::default();
        assert_eq!(
            default.release_url("1.21.0", "onnxruntime-win-x64-1.21.0.zip"),
            "https://github.com/microsoft/onnxruntime/releases/download/v1.21.0/onnxruntime-win-x64-1.21.0.zip"
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
            version = "1.17.3"
            output_dir = "third_party/ort"

            [layout]
            flatten_libraries = false
        "#;
        let config = PipelineConfig::from_toml(toml, Path::new("ortpull.toml")).unwrap();
        assert_eq!(config.version, "1.17.3");
        assert_eq!(config.output_dir, PathBuf::from("third_party/ort"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(!config.layout.flatten_libraries);
        assert_eq!(config.layout.payload_stem, "onnxruntime");
    }

    #[test]
    fn test_invalid_toml() {
        let err = PipelineConfig::from_toml("timeout_secs = \"soon\"", Path::new("bad.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            ("ORTPULL_VERSION", "1.20.1"),
            ("ORTPULL_OUTPUT_DIR", "/opt/ort"),
            ("ORTPULL_TIMEOUT_SECS", "30"),
        ]
        .into_iter()
        .collect();

        let mut config = PipelineConfig::default();
        config
            .apply_env(|k| env.get(k).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.version, "1.20.1");
        assert_eq!(config.output_dir, PathBuf::from("/opt/ort"));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(
            config.temp_root(),
            PathBuf::from("/opt/ort/temp_onnx_download")
        );
    }

    #[test]
    fn test_env_invalid_timeout() {
        let mut config = PipelineConfig::default();
        let err = config
            .apply_env(|k| (k == "ORTPULL_TIMEOUT_SECS").then(|| "never".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                key: "ORTPULL_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn test_temp_dir_is_a_parent_not_the_root() {
        let config = PipelineConfig {
            output_dir: PathBuf::from("/work/ort"),
            temp_dir: Some(PathBuf::from("/tmp")),
            ..PipelineConfig::default()
        };
        assert_eq!(config.temp_root(), Path::new("/tmp/temp_onnx_download"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_temp_dir_equal_to_output_is_safe() {
        let config = PipelineConfig {
            output_dir: PathBuf::from("/work/ort"),
            temp_dir: Some(PathBuf::from("/work/ort")),
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.temp_root(),
            Path::new("/work/ort/temp_onnx_download")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_inside_temp_root_is_rejected() {
        let config = PipelineConfig {
            output_dir: PathBuf::from("/work/temp_onnx_download/ort"),
            temp_dir: Some(PathBuf::from("/work")),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TempRootOverlapsOutput { .. })
        ));

        let sneaky = PipelineConfig {
            output_dir: PathBuf::from("/work/x/../temp_onnx_download"),
            temp_dir: Some(PathBuf::from("/work/./")),
            ..PipelineConfig::default()
        };
        assert!(sneaky.validate().is_err());
    }

    #[test]
    fn test_library_names() {
        let layout = LayoutOptions::default();
        assert!(layout.is_library_name("onnxruntime.dll"));
        assert!(layout.is_library_name("libonnxruntime.so.1.21.0"));
        assert!(layout.is_library_name("libonnxruntime.1.21.0.dylib"));
        assert!(!layout.is_library_name("onnxruntime_providers_shared.dll"));
        assert!(!layout.is_library_name("libfoo.so"));
        assert_eq!(layout.payload_prefix("osx", "arm64"), "onnxruntime-osx-arm64");
    }
}
