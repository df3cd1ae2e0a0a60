//! Error types for stylesheet compilation and emission.
//!
//! Copyright (c) 2025 Posit, PBC

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use stylebridge_runtime::RuntimeError;
use thiserror::Error;

/// Errors that abort the processing of a single module.
#[derive(Debug, Error)]
pub enum StyleError {
    /// The stylesheet compiler rejected the input
    #[error("failed to compile {}: {message}", .file.display())]
    Compile { file: PathBuf, message: String },

    /// An `@import`/`@use` reference could not be mapped to a file
    #[error("can't resolve import \"{reference}\" from {}", .importer.display())]
    ImportResolution { reference: String, importer: PathBuf },

    /// A user-supplied importer failed
    #[error("importer failed: {message}")]
    Importer { message: String },

    /// Reading a source file failed
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// Invalid plugin configuration
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl StyleError {
    /// Convenience constructor for user importers reporting a failure.
    pub fn importer(message: impl Into<String>) -> Self {
        StyleError::Importer {
            message: message.into(),
        }
    }

    pub(crate) fn read(path: &Path, source: RuntimeError) -> Self {
        StyleError::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A failed directory creation or file write during emission.
///
/// These are reported per output file and never abort sibling writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemError {
    /// The path the write (or directory creation) targeted.
    pub path: PathBuf,
    /// I/O error kind, when the runtime reported one.
    pub kind: Option<io::ErrorKind>,
    /// Raw OS error code, when the runtime reported one.
    pub code: Option<i32>,
    /// Rendered error message.
    pub message: String,
}

impl FilesystemError {
    pub(crate) fn new(path: &Path, err: &RuntimeError) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: Some(err.io_kind()),
            code: err.os_code(),
            message: err.to_string(),
        }
    }

    /// Short identifier for console output: the OS error code when known,
    /// otherwise the error kind.
    pub fn code_label(&self) -> String {
        match (self.code, self.kind) {
            (Some(code), Some(kind)) => format!("{:?} (os error {})", kind, code),
            (Some(code), None) => format!("os error {}", code),
            (None, Some(kind)) => format!("{:?}", kind),
            (None, None) => "unknown error".to_string(),
        }
    }
}

impl fmt::Display for FilesystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.code_label())
    }
}

impl std::error::Error for FilesystemError {}
