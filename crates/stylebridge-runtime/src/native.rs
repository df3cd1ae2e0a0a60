/*
 * native.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * NativeRuntime implementation backed by std::fs.
 *
 * This is the default runtime for hosts that build straight to disk.
 */

use std::fs;
use std::path::{Path, PathBuf};

use crate::traits::{PathKind, RuntimeError, RuntimeResult, SystemRuntime};

/// Native runtime with full filesystem access.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeRuntime;

impl NativeRuntime {
    /// Create a new NativeRuntime with default settings.
    pub fn new() -> Self {
        Self
    }
}

impl SystemRuntime for NativeRuntime {
    // ═══════════════════════════════════════════════════════════════════════
    // FILE OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        fs::read(path).map_err(RuntimeError::from)
    }

    fn file_write(&self, path: &Path, contents: &[u8]) -> RuntimeResult<()> {
        fs::write(path, contents).map_err(RuntimeError::from)
    }

    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool> {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(RuntimeError::from(e)),
        };

        Ok(match kind {
            None => true,
            Some(PathKind::File) => metadata.is_file(),
            Some(PathKind::Directory) => metadata.is_dir(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DIRECTORY OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    fn dir_create(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        if recursive {
            fs::create_dir_all(path).map_err(RuntimeError::from)
        } else {
            fs::create_dir(path).map_err(RuntimeError::from)
        }
    }

    fn cwd(&self) -> RuntimeResult<PathBuf> {
        std::env::current_dir().map_err(RuntimeError::from)
    }
}
