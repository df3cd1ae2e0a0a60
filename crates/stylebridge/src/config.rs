//! Plugin configuration.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Options are read with camelCase keys so an existing bundler config can be
//! passed through unchanged:
//!
//! ```json
//! {
//!   "outFile": "dist/bundle.css",
//!   "exclude": ["**/vendor/**"],
//!   "outputStyle": "compressed",
//!   "includePaths": ["node_modules"]
//! }
//! ```
//!
//! `outFile`, `outDir`, `include`, `exclude`, `data` and the importers are
//! interpreted by the plugin. Everything else belongs to the compiler, and
//! keys the compiler options don't name are kept in
//! [`CompilerOptions::extra`] and forwarded verbatim.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use stylebridge_runtime::SystemRuntime;

use crate::error::StyleError;
use crate::importer::Importer;

/// Configuration for one plugin instance. Immutable for the duration of a
/// build.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginConfig {
    /// Inline source compiled instead of each entry file's contents.
    pub data: Option<String>,

    /// Glob patterns an id must match to be handled. Empty means "any file
    /// with a recognized stylesheet extension".
    #[serde(deserialize_with = "one_or_many")]
    pub include: Vec<String>,

    /// Glob patterns excluded from handling.
    #[serde(deserialize_with = "one_or_many")]
    pub exclude: Vec<String>,

    /// Merged-file destination.
    pub out_file: Option<PathBuf>,

    /// Directory destination (one file per entry point).
    pub out_dir: Option<PathBuf>,

    /// Extra importers, consulted in order after the built-in one.
    #[serde(skip)]
    pub importers: Vec<Arc<dyn Importer>>,

    /// Options handed to the stylesheet compiler.
    #[serde(flatten)]
    pub compiler: CompilerOptions,
}

impl PluginConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, StyleError> {
        serde_json::from_str(json).map_err(|e| StyleError::Config {
            message: e.to_string(),
        })
    }

    /// Read and parse a JSON configuration file through `runtime`.
    pub fn from_json_file(runtime: &dyn SystemRuntime, path: &Path) -> Result<Self, StyleError> {
        let text = runtime.file_read_string(path).map_err(|e| StyleError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_json_str(&text)
    }

    pub fn with_out_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_file = Some(path.into());
        self
    }

    pub fn with_out_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(path.into());
        self
    }

    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Append a user importer.
    pub fn with_importer(mut self, importer: impl Importer + 'static) -> Self {
        self.importers.push(Arc::new(importer));
        self
    }

    pub fn with_output_style(mut self, style: OutputStyle) -> Self {
        self.compiler.output_style = Some(style);
        self
    }
}

/// Formatting of the compiled CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    Nested,
    Expanded,
    Compact,
    Compressed,
}

impl std::str::FromStr for OutputStyle {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nested" => Ok(OutputStyle::Nested),
            "expanded" => Ok(OutputStyle::Expanded),
            "compact" => Ok(OutputStyle::Compact),
            "compressed" => Ok(OutputStyle::Compressed),
            other => Err(StyleError::Config {
                message: format!("unknown output style: {}", other),
            }),
        }
    }
}

/// Source map setting: on/off, or an explicit map path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceMap {
    Enabled(bool),
    Path(String),
}

/// Options forwarded to the stylesheet compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    pub output_style: Option<OutputStyle>,
    /// Parse entries as the indented (`.sass`) syntax.
    pub indented_syntax: bool,
    /// Additional load paths for `@import`/`@use`.
    pub include_paths: Vec<PathBuf>,
    pub indent_width: Option<u32>,
    pub indent_type: Option<String>,
    pub linefeed: Option<String>,
    pub precision: Option<u32>,
    pub source_map: Option<SourceMap>,
    pub source_comments: bool,
    /// Custom compiler functions, forwarded untouched.
    pub functions: Option<serde_json::Value>,
    /// Unrecognized keys, forwarded verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl CompilerOptions {
    /// Names of set options the given backend has no equivalent for.
    pub(crate) fn unsupported_by_grass(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.indent_width.is_some() {
            out.push("indentWidth".to_string());
        }
        if self.indent_type.is_some() {
            out.push("indentType".to_string());
        }
        if self.linefeed.is_some() {
            out.push("linefeed".to_string());
        }
        if self.precision.is_some() {
            out.push("precision".to_string());
        }
        if self.source_map.is_some() {
            out.push("sourceMap".to_string());
        }
        if self.source_comments {
            out.push("sourceComments".to_string());
        }
        if self.functions.is_some() {
            out.push("functions".to_string());
        }
        out.extend(self.extra.keys().cloned());
        out
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}
