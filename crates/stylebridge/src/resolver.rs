//! Mapping import references to files on disk.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::{Path, PathBuf};

use stylebridge_runtime::SystemRuntime;

use crate::paths::normalize;

/// Module-resolution service: turn a candidate path into an existing file.
pub trait ModuleResolver {
    /// Resolve `path`, trying `extensions` (each with a leading dot) in order
    /// when the exact path is not a file. Returns `None` when nothing matches.
    fn resolve(&self, path: &Path, extensions: &[&str]) -> Option<PathBuf>;
}

/// Default resolver backed by a [`SystemRuntime`].
///
/// Candidates are tried in this order, stopping at the first existing file:
///
/// 1. the path itself
/// 2. `path + ext` for each extension
/// 3. the Sass partial `_name + ext`
/// 4. `path/index + ext`, then `path/_index + ext`
pub struct RuntimeResolver<'a> {
    runtime: &'a dyn SystemRuntime,
}

impl<'a> RuntimeResolver<'a> {
    pub fn new(runtime: &'a dyn SystemRuntime) -> Self {
        Self { runtime }
    }

    fn is_file(&self, path: &Path) -> bool {
        self.runtime.is_file(path).unwrap_or(false)
    }

    fn candidates(path: &Path, extensions: &[&str]) -> Vec<PathBuf> {
        let mut out = vec![path.to_path_buf()];

        let file_name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => return out,
        };

        for ext in extensions {
            out.push(path.with_file_name(format!("{}{}", file_name, ext)));
        }
        if !file_name.starts_with('_') {
            for ext in extensions {
                out.push(path.with_file_name(format!("_{}{}", file_name, ext)));
            }
        }
        for index in ["index", "_index"] {
            for ext in extensions {
                out.push(path.join(format!("{}{}", index, ext)));
            }
        }
        out
    }
}

impl std::fmt::Debug for RuntimeResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeResolver")
            .field("runtime", &"<SystemRuntime>")
            .finish()
    }
}

impl ModuleResolver for RuntimeResolver<'_> {
    fn resolve(&self, path: &Path, extensions: &[&str]) -> Option<PathBuf> {
        let path = normalize(path);
        Self::candidates(&path, extensions)
            .into_iter()
            .find(|candidate| self.is_file(candidate))
    }
}
