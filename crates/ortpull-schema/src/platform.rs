//! Platform identities and the built-in release registry.
//!
//! Upstream names its archives with its own OS/arch labels (`win`, `osx`,
//! `x64`, `aarch64`, ...). The output tree uses Go-style labels
//! (`windows`, `darwin`, `amd64`, `arm64`). Each [`PlatformTarget`] pairs
//! the two so a selector like `linux-arm64` can be turned into the exact
//! archive name upstream publishes.

use std::str::FromStr;

use thiserror::Error;

use crate::ArchiveFormat;

/// Placeholder substituted with the release version in filename templates.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// One supported platform combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTarget {
    /// OS label used by upstream archive names (`win`, `osx`, `linux`).
    pub archive_os: &'static str,
    /// Arch label used by upstream archive names (`x64`, `x86_64`, `arm64`, `aarch64`).
    pub archive_arch: &'static str,
    /// Canonical OS label in the output tree.
    pub target_os: &'static str,
    /// Canonical arch label in the output tree.
    pub target_arch: &'static str,
    /// Container format of the upstream archive.
    pub format: ArchiveFormat,
    /// Archive file name with a [`VERSION_PLACEHOLDER`].
    pub filename_template: &'static str,
}

impl PlatformTarget {
    /// Archive file name for a concrete version.
    ///
    /// ```
    /// use ortpull_schema::REGISTRY;
    ///
    /// assert_eq!(
    ///     REGISTRY[0].archive_filename("1.21.0"),
    ///     "onnxruntime-win-x64-1.21.0.zip"
    /// );
    /// ```
    pub fn archive_filename(&self, version: &str) -> String {
        self.filename_template.replace(VERSION_PLACEHOLDER, version)
    }

    /// Selector form, `{target_os}-{target_arch}`.
    pub fn selector(&self) -> String {
        format!("{}-{}", self.target_os, self.target_arch)
    }

    /// Output directory name, `{target_arch}_{target_os}`.
    pub fn publish_dir_name(&self) -> String {
        format!("{}_{}", self.target_arch, self.target_os)
    }

    /// Upstream tuple, `{archive_os}-{archive_arch}`.
    pub fn archive_tuple(&self) -> String {
        format!("{}-{}", self.archive_os, self.archive_arch)
    }

    /// Whether this target answers to the given selector.
    pub fn matches(&self, selector: &PlatformSelector) -> bool {
        self.target_os == selector.os && self.target_arch == selector.arch
    }
}

impl std::fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.target_os, self.target_arch)
    }
}

/// Built-in registry, in processing order.
///
/// `(target_os, target_arch)` is unique across rows.
pub const REGISTRY: &[PlatformTarget] = &[
    PlatformTarget {
        archive_os: "win",
        archive_arch: "x64",
        target_os: "windows",
        target_arch: "amd64",
        format: ArchiveFormat::Zip,
        filename_template: "onnxruntime-win-x64-{version}.zip",
    },
    // Upstream labels Intel macOS builds x86_64, not x64.
    PlatformTarget {
        archive_os: "osx",
        archive_arch: "x86_64",
        target_os: "darwin",
        target_arch: "amd64",
        format: ArchiveFormat::TarGz,
        filename_template: "onnxruntime-osx-x86_64-{version}.tgz",
    },
    PlatformTarget {
        archive_os: "osx",
        archive_arch: "arm64",
        target_os: "darwin",
        target_arch: "arm64",
        format: ArchiveFormat::TarGz,
        filename_template: "onnxruntime-osx-arm64-{version}.tgz",
    },
    PlatformTarget {
        archive_os: "linux",
        archive_arch: "x64",
        target_os: "linux",
        target_arch: "amd64",
        format: ArchiveFormat::TarGz,
        filename_template: "onnxruntime-linux-x64-{version}.tgz",
    },
    PlatformTarget {
        archive_os: "linux",
        archive_arch: "aarch64",
        target_os: "linux",
        target_arch: "arm64",
        format: ArchiveFormat::TarGz,
        filename_template: "onnxruntime-linux-aarch64-{version}.tgz",
    },
    PlatformTarget {
        archive_os: "win",
        archive_arch: "arm64",
        target_os: "windows",
        target_arch: "arm64",
        format: ArchiveFormat::Zip,
        filename_template: "onnxruntime-win-arm64-{version}.zip",
    },
];

/// Find the registry row for a selector.
pub fn lookup<'a>(
    registry: &'a [PlatformTarget],
    selector: &PlatformSelector,
) -> Option<&'a PlatformTarget> {
    registry.iter().find(|t| t.matches(selector))
}

/// Errors produced while turning a selector string into a platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// Not of the form `os-arch`.
    #[error("invalid platform string '{0}', expected os-arch (e.g. windows-amd64)")]
    Malformed(String),

    /// Well-formed but absent from the registry.
    #[error("platform '{os}-{arch}' is not recognized or configured")]
    Unknown {
        /// Requested OS label.
        os: String,
        /// Requested arch label.
        arch: String,
    },
}

/// A requested `{target_os}-{target_arch}` pair.
///
/// Parsing lowercases both halves and splits on the first `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSelector {
    /// Canonical OS label.
    pub os: String,
    /// Canonical arch label.
    pub arch: String,
}

impl FromStr for PlatformSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once('-') {
            Some((os, arch)) if !os.is_empty() && !arch.is_empty() => Ok(Self {
                os: os.to_lowercase(),
                arch: arch.to_lowercase(),
            }),
            _ => Err(SelectorError::Malformed(s.to_string())),
        }
    }
}

impl std::fmt::Display for PlatformSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_target_tuples_unique() {
        let mut seen = HashSet::new();
        for target in REGISTRY {
            assert!(
                seen.insert((target.target_os, target.target_arch)),
                "duplicate registry row for {target}"
            );
        }
    }

    #[test]
    fn test_registry_templates_agree_with_format() {
        for target in REGISTRY {
            assert!(target.filename_template.contains(VERSION_PLACEHOLDER));
            assert!(
                target
                    .filename_template
                    .ends_with(&format!(".{}", target.format.extension())),
                "{} does not end with its format extension",
                target.filename_template
            );
            assert!(
                target
                    .filename_template
                    .starts_with(&format!("onnxruntime-{}-", target.archive_tuple())),
            );
        }
    }

    #[test]
    fn test_archive_filename() {
        let osx = lookup(REGISTRY, &"darwin-amd64".parse().unwrap()).unwrap();
        assert_eq!(
            osx.archive_filename("1.17.3"),
            "onnxruntime-osx-x86_64-1.17.3.tgz"
        );
        assert_eq!(osx.publish_dir_name(), "amd64_darwin");
        assert_eq!(osx.selector(), "darwin-amd64");
    }

    #[test]
    fn test_selector_parse() {
        let sel: PlatformSelector = "Windows-AMD64".parse().unwrap();
        assert_eq!(sel.os, "windows");
        assert_eq!(sel.arch, "amd64");
    }

    #[test]
    fn test_selector_malformed() {
        for bad in ["windows", "-amd64", "linux-", "", "linuxarm64"] {
            assert_eq!(
                bad.parse::<PlatformSelector>(),
                Err(SelectorError::Malformed(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_lookup_unknown() {
        let sel: PlatformSelector = "freebsd-amd64".parse().unwrap();
        assert!(lookup(REGISTRY, &sel).is_none());
    }
}
