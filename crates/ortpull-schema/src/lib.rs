//! Shared types for ortpull: the platform registry and archive formats.

pub mod format;
pub mod platform;

// Re-exports
pub use format::ArchiveFormat;
pub use platform::{
    PlatformSelector, PlatformTarget, REGISTRY, SelectorError, VERSION_PLACEHOLDER, lookup,
};

/// Release fetched when the caller does not pin one.
pub const DEFAULT_ORT_VERSION: &str = "1.21.0";

/// Name stem shared by upstream payload directories and library files.
pub const PAYLOAD_STEM: &str = "onnxruntime";
