//! Stylesheet bundling for JavaScript bundlers.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate provides:
//! - URL rebasing of compiled CSS (`rebase`)
//! - An import adapter that resolves, rebases and watches imported files
//! - A per-build registry of compiled stylesheets
//! - Output emission to a merged file, a directory, or a bundle asset
//! - `SassPlugin`, the bundler-facing facade tying these together

mod compiler;
mod config;
mod emit;
mod error;
mod filter;
mod grass_compiler;
mod importer;
pub mod paths;
mod plugin;
mod rebase;
mod registry;
mod resolver;
mod session;

pub use compiler::{CompileOutput, CompileRequest, StyleCompiler};
pub use config::{CompilerOptions, OutputStyle, PluginConfig, SourceMap};
pub use emit::{
    Bundle, BundleAsset, EmitReport, OutputEmitter, OutputOptions, OutputTarget, WriteOutcome,
    format_size,
};
pub use error::{FilesystemError, StyleError};
pub use filter::StyleFilter;
pub use grass_compiler::GrassCompiler;
pub use importer::{ImportCallback, ImportResolver, ImportedFile, Importer, ImporterResult};
pub use plugin::{PLACEHOLDER_MODULE, PluginContext, SassPlugin};
pub use rebase::{is_rebaseable, rebase};
pub use registry::{StyleRegistry, StyleUnit, WatchSet};
pub use resolver::{ModuleResolver, RuntimeResolver};
pub use session::BuildSession;
