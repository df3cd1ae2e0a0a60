/*
 * traits.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Defines the SystemRuntime trait and supporting types for the runtime abstraction layer.
 *
 * The style adapter never touches std::fs directly. Reads of imported
 * stylesheets, directory creation and output writes all go through this
 * trait, so a host bundler can hand in its own virtual filesystem and tests
 * can observe what was written.
 */

use std::io;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug)]
pub enum RuntimeError {
    /// Standard I/O error
    Io(io::Error),
}

impl RuntimeError {
    /// The I/O error kind.
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            RuntimeError::Io(e) => e.kind(),
        }
    }

    /// The raw OS error code (e.g. `ENOENT` = 2 on unix), when there is one.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            RuntimeError::Io(e) => e.raw_os_error(),
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> Self {
        RuntimeError::Io(e)
    }
}

/// Type of filesystem path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// Trait defining the filesystem operations the adapter needs.
///
/// Implementations must be shareable across threads: output files are
/// written concurrently once all directories exist.
pub trait SystemRuntime: Send + Sync {
    // ═══════════════════════════════════════════════════════════════════════
    // FILE OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Read entire file contents as bytes.
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Read file as string with UTF-8 encoding.
    ///
    /// Default implementation reads bytes and converts to string.
    fn file_read_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.file_read(path)?;
        String::from_utf8(bytes).map_err(|e| {
            RuntimeError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid UTF-8 in file: {}", e),
            ))
        })
    }

    /// Write bytes to file (creates or overwrites).
    ///
    /// The parent directory must already exist.
    fn file_write(&self, path: &Path, contents: &[u8]) -> RuntimeResult<()>;

    /// Check if path exists, optionally filtering by type.
    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool>;

    /// Check if path exists and is a file.
    fn is_file(&self, path: &Path) -> RuntimeResult<bool> {
        self.path_exists(path, Some(PathKind::File))
    }

    /// Check if path exists and is a directory.
    fn is_dir(&self, path: &Path) -> RuntimeResult<bool> {
        self.path_exists(path, Some(PathKind::Directory))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DIRECTORY OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Create directory (optionally with parents).
    ///
    /// With `recursive`, an already existing directory is not an error.
    fn dir_create(&self, path: &Path, recursive: bool) -> RuntimeResult<()>;

    /// Get current working directory.
    fn cwd(&self) -> RuntimeResult<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_display() {
        let err = RuntimeError::from(io::Error::new(io::ErrorKind::NotFound, "missing.css"));
        assert!(err.to_string().contains("I/O error"));
        assert!(err.to_string().contains("missing.css"));
    }

    #[test]
    fn test_runtime_error_codes() {
        let err = RuntimeError::from(io::Error::from_raw_os_error(2));
        assert_eq!(err.os_code(), Some(2));
        assert_eq!(err.io_kind(), io::ErrorKind::NotFound);

        let err = RuntimeError::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err.os_code(), None);
        assert_eq!(err.io_kind(), io::ErrorKind::PermissionDenied);
    }
}
