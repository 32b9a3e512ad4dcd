//! Archive container formats published upstream.

use std::path::Path;

/// Container format of an upstream release archive.
///
/// The set is closed: upstream only ships Windows builds as zip files and
/// everything else as gzip-compressed tarballs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// `.zip`
    Zip,
    /// `.tgz` / `.tar.gz`
    TarGz,
}

impl ArchiveFormat {
    /// Canonical extension used in registry filename templates.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tgz",
        }
    }

    /// Detect the format from a file name suffix (case-insensitive).
    ///
    /// Returns `None` for any suffix outside the supported set.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();

        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tgz") || name.ends_with(".tar.gz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("onnxruntime-win-x64-1.21.0.zip")),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("onnxruntime-osx-arm64-1.21.0.tgz")),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("/tmp/dl/pkg.tar.gz")),
            Some(ArchiveFormat::TarGz)
        );
    }

    #[test]
    fn test_from_path_case_insensitive() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("FOO.ZIP")),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("bar.TAR.GZ")),
            Some(ArchiveFormat::TarGz)
        );
    }

    #[test]
    fn test_from_path_unsupported() {
        assert_eq!(ArchiveFormat::from_path(Path::new("foo.tar.zst")), None);
        assert_eq!(ArchiveFormat::from_path(Path::new("foo.tar")), None);
        assert_eq!(ArchiveFormat::from_path(Path::new("zip")), None);
    }
}
