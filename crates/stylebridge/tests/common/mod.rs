//! Shared fixtures for the integration tests.
//!
//! Copyright (c) 2025 Posit, PBC

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use stylebridge::{
    CompileOutput, CompileRequest, ImportCallback, PluginContext, StyleCompiler, StyleError,
};
use stylebridge_runtime::{NativeRuntime, PathKind, RuntimeError, RuntimeResult, SystemRuntime};

/// Compiler that only understands `@import "name";` lines and copies every
/// other line through. Imports are requested from the callback and inlined
/// recursively, which is enough to exercise the adapter without grass.
#[derive(Debug, Default)]
pub struct ScriptedCompiler;

impl ScriptedCompiler {
    fn expand(
        source: &str,
        current: &Path,
        imports: &mut dyn ImportCallback,
        css: &mut String,
        included: &mut Vec<PathBuf>,
    ) -> Result<(), StyleError> {
        for line in source.lines() {
            let trimmed = line.trim();
            if let Some(reference) = trimmed
                .strip_prefix("@import \"")
                .and_then(|rest| rest.strip_suffix("\";"))
            {
                let imported = imports.import(reference, Some(current))?;
                included.push(imported.file.clone());
                Self::expand(&imported.contents, &imported.file, imports, css, included)?;
            } else if !trimmed.is_empty() {
                css.push_str(trimmed);
                css.push('\n');
            }
        }
        Ok(())
    }
}

impl StyleCompiler for ScriptedCompiler {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn compile(
        &self,
        request: &CompileRequest<'_>,
        imports: &mut dyn ImportCallback,
    ) -> Result<CompileOutput, StyleError> {
        let mut css = String::new();
        let mut included = Vec::new();
        Self::expand(request.source, request.entry, imports, &mut css, &mut included)?;
        Ok(CompileOutput {
            css,
            included_files: included,
        })
    }
}

/// Collects the files the plugin asks the host to watch.
#[derive(Debug, Default)]
pub struct RecordingContext {
    pub watched: Vec<PathBuf>,
}

impl PluginContext for RecordingContext {
    fn add_watch_file(&mut self, path: &Path) {
        self.watched.push(path.to_path_buf());
    }
}

/// Native runtime whose working directory is pinned and whose writes fail
/// for any path containing `deny`.
#[derive(Debug)]
pub struct FixtureRuntime {
    inner: NativeRuntime,
    cwd: PathBuf,
    deny: Option<String>,
}

impl FixtureRuntime {
    pub fn new(cwd: &Path) -> Self {
        Self {
            inner: NativeRuntime::new(),
            cwd: cwd.to_path_buf(),
            deny: None,
        }
    }

    pub fn deny_writes_to(mut self, fragment: &str) -> Self {
        self.deny = Some(fragment.to_string());
        self
    }

    fn denied(&self, path: &Path) -> bool {
        self.deny
            .as_deref()
            .is_some_and(|fragment| path.to_string_lossy().contains(fragment))
    }
}

impl SystemRuntime for FixtureRuntime {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.inner.file_read(path)
    }

    fn file_write(&self, path: &Path, contents: &[u8]) -> RuntimeResult<()> {
        if self.denied(path) {
            return Err(RuntimeError::Io(io::Error::from(io::ErrorKind::PermissionDenied)));
        }
        self.inner.file_write(path, contents)
    }

    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool> {
        self.inner.path_exists(path, kind)
    }

    fn dir_create(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        if self.denied(path) {
            return Err(RuntimeError::Io(io::Error::from(io::ErrorKind::PermissionDenied)));
        }
        self.inner.dir_create(path, recursive)
    }

    fn cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
