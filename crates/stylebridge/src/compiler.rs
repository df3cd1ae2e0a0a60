//! The seam between the plugin and the stylesheet compiler.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::{Path, PathBuf};

use crate::config::CompilerOptions;
use crate::error::StyleError;
use crate::importer::ImportCallback;

/// Everything the compiler needs for one entry point.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    /// Identity of the entry point; relative imports resolve from its directory.
    pub entry: &'a Path,
    /// Source text to compile (the entry's contents or the inline `data`).
    pub source: &'a str,
    pub options: &'a CompilerOptions,
}

/// Result of a successful compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
    pub css: String,
    /// Imported files the compiler read. The entry point itself is not listed.
    pub included_files: Vec<PathBuf>,
}

/// A synchronous stylesheet compiler.
///
/// Implementations must route every import through `imports` and must not
/// swallow its errors: an importer failure fails the compile.
pub trait StyleCompiler: Send + Sync {
    /// Backend name, for diagnostics.
    fn name(&self) -> &'static str;

    fn compile(
        &self,
        request: &CompileRequest<'_>,
        imports: &mut dyn ImportCallback,
    ) -> Result<CompileOutput, StyleError>;
}
