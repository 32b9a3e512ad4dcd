//! Payload location and publishing.
//!
//! Upstream archives wrap their payload in a directory such as
//! `onnxruntime-linux-x64-1.21.0/` holding `include/` and `lib/`. The name
//! does not always match the archive file name exactly, so the payload is
//! found by prefix. Its headers and libraries are then republished into the
//! canonical target tree:
//!
//! ```text
//! {publish_path}/
//! ├── include/            # copied recursively
//! ├── libonnxruntime.so   # flattened out of lib/
//! └── onnxruntime.dll
//! ```
//!
//! Publishing replaces, it never merges: stale headers and library files
//! from a previous version are removed first.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::LayoutOptions;

const INCLUDE_DIR: &str = "include";
const LIB_DIR: &str = "lib";

/// Errors raised while republishing an extracted payload.
#[derive(Error, Debug)]
pub enum OrganizeError {
    /// No payload directory in the extraction output.
    #[error("no directory starting with '{prefix}' (and no include/lib) in {}", .dir.display())]
    PayloadNotFound {
        /// Expected directory name prefix.
        prefix: String,
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// The payload lacks `include/` or `lib/`.
    #[error("'{name}' directory not found in {}", .root.display())]
    MissingDirectory {
        /// Name of the missing directory.
        name: &'static str,
        /// Payload root it was expected in.
        root: PathBuf,
    },

    /// Filesystem failure while preparing the target.
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// Path the operation failed on.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// A file or tree could not be copied.
    #[error("failed to copy {} to {}: {message}", .from.display(), .to.display())]
    Copy {
        /// Copy source.
        from: PathBuf,
        /// Copy destination.
        to: PathBuf,
        /// Underlying error, rendered.
        message: String,
    },
}

fn io_at(path: &Path) -> impl FnOnce(io::Error) -> OrganizeError + '_ {
    move |source| OrganizeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// What a successful publish produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeReport {
    /// Directory the payload was taken from.
    pub payload_root: PathBuf,
    /// Number of regular files under the published `include/`.
    pub header_files: usize,
    /// Library file names copied, sorted.
    pub libraries: Vec<String>,
}

/// Find the payload root inside an extraction directory.
///
/// Immediate child directories whose names start with `prefix` are
/// candidates; the lexicographically first one wins. With no candidate, the
/// extraction directory itself is used if it directly holds `include/` and
/// `lib/`.
pub fn locate_payload(extracted_dir: &Path, prefix: &str) -> Result<PathBuf, OrganizeError> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(extracted_dir)
        .map_err(io_at(extracted_dir))?
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    candidates.sort();

    if let Some(first) = candidates.into_iter().next() {
        return Ok(first);
    }

    if extracted_dir.join(INCLUDE_DIR).is_dir() && extracted_dir.join(LIB_DIR).is_dir() {
        tracing::info!(
            dir = %extracted_dir.display(),
            "found include/lib directly in extraction path"
        );
        return Ok(extracted_dir.to_path_buf());
    }

    Err(OrganizeError::PayloadNotFound {
        prefix: prefix.to_string(),
        dir: extracted_dir.to_path_buf(),
    })
}

/// Directory library files are published into.
pub fn library_dir(publish_path: &Path, layout: &LayoutOptions) -> PathBuf {
    if layout.flatten_libraries {
        publish_path.to_path_buf()
    } else {
        publish_path.join(LIB_DIR)
    }
}

/// Remove library files in `dir` that follow either naming convention.
fn prune_libraries(dir: &Path, layout: &LayoutOptions) -> Result<usize, OrganizeError> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir).map_err(io_at(dir))? {
        let entry = entry.map_err(io_at(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_at(&path))?;
        if file_type.is_dir() || !layout.is_library_name(&entry.file_name().to_string_lossy()) {
            continue;
        }
        fs::remove_file(&path).map_err(io_at(&path))?;
        removed += 1;
    }
    Ok(removed)
}

/// Clear stale artifacts from a publish path, creating it if needed.
///
/// Library files are pruned from both the flat root and a nested `lib/`, so
/// switching layouts between runs leaves nothing behind.
pub fn prepare_target(publish_path: &Path, layout: &LayoutOptions) -> Result<(), OrganizeError> {
    fs::create_dir_all(publish_path).map_err(io_at(publish_path))?;

    let include = publish_path.join(INCLUDE_DIR);
    if let Ok(meta) = fs::symlink_metadata(&include) {
        if meta.is_dir() {
            fs::remove_dir_all(&include).map_err(io_at(&include))?;
        } else {
            fs::remove_file(&include).map_err(io_at(&include))?;
        }
    }

    let removed = prune_libraries(publish_path, layout)?
        + prune_libraries(&publish_path.join(LIB_DIR), layout)?;
    if removed > 0 {
        tracing::debug!(path = %publish_path.display(), removed, "pruned stale libraries");
    }
    Ok(())
}

/// Recursively copy a directory tree from `src` into `dst`.
///
/// Uses `fs_extra` for recursive copying with overwrite semantics.
fn copy_dir_all(src: &Path, dst: &Path) -> Result<(), OrganizeError> {
    fs::create_dir_all(dst).map_err(io_at(dst))?;
    fs_extra::dir::copy(
        src,
        dst,
        &fs_extra::dir::CopyOptions::new()
            .content_only(true)
            .overwrite(true),
    )
    .map_err(|e| OrganizeError::Copy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}

/// Copy library files directly inside `lib_src` into `dest`. Returns their names.
fn copy_libraries(
    lib_src: &Path,
    dest: &Path,
    layout: &LayoutOptions,
) -> Result<Vec<String>, OrganizeError> {
    fs::create_dir_all(dest).map_err(io_at(dest))?;

    let mut names: Vec<String> = fs::read_dir(lib_src)
        .map_err(io_at(lib_src))?
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| layout.is_library_name(name))
        .collect();
    names.sort();

    for name in &names {
        let from = lib_src.join(name);
        let to = dest.join(name);
        fs::copy(&from, &to).map_err(|e| OrganizeError::Copy {
            from,
            to,
            message: e.to_string(),
        })?;
    }
    Ok(names)
}

/// Republish an extracted archive into `publish_path`.
///
/// The payload is located and validated before anything under
/// `publish_path` is touched, so a structural failure leaves the previous
/// publish intact. I/O failures after that point are not rolled back.
pub fn organize(
    extracted_dir: &Path,
    publish_path: &Path,
    archive_os: &str,
    archive_arch: &str,
    layout: &LayoutOptions,
) -> Result<OrganizeReport, OrganizeError> {
    let prefix = layout.payload_prefix(archive_os, archive_arch);
    let payload_root = locate_payload(extracted_dir, &prefix)?;

    let include_src = payload_root.join(INCLUDE_DIR);
    let lib_src = payload_root.join(LIB_DIR);
    for (name, dir) in [(INCLUDE_DIR, &include_src), (LIB_DIR, &lib_src)] {
        if !dir.is_dir() {
            return Err(OrganizeError::MissingDirectory {
                name,
                root: payload_root.clone(),
            });
        }
    }

    prepare_target(publish_path, layout)?;

    let include_dst = publish_path.join(INCLUDE_DIR);
    copy_dir_all(&include_src, &include_dst)?;
    let header_files = walkdir::WalkDir::new(&include_dst)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .count();

    let libraries = copy_libraries(&lib_src, &library_dir(publish_path, layout), layout)?;
    if libraries.is_empty() {
        tracing::warn!(
            lib = %lib_src.display(),
            "no library files ({}) found",
            layout.library_prefixes().map(|p| format!("{p}*")).join(", ")
        );
    }

    Ok(OrganizeReport {
        payload_root,
        header_files,
        libraries,
    })
}
