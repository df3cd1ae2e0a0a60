//! SASS compilation using the grass crate.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! grass has no importer callback; it resolves imports itself by probing
//! candidate paths through its `Fs` trait. `ImporterFs` turns each probe into
//! an [`ImportCallback`] request, serves the returned (already rebased)
//! contents back to grass, and records which files were read. Importer errors
//! can't travel through `Fs::is_file`, so they are stashed and returned after
//! grass finishes.
//!
//! Probes carry no requesting file, so when an import can't be found the
//! requester is recovered afterwards: from the file named in grass's error
//! trace, or else from the most recently read file whose directory the last
//! failed probe was made from.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use grass::{InputSyntax, Options, OutputStyle as GrassStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use stylebridge_runtime::SystemRuntime;
use tracing::debug;

use crate::compiler::{CompileOutput, CompileRequest, StyleCompiler};
use crate::config::{CompilerOptions, OutputStyle};
use crate::error::StyleError;
use crate::importer::{ImportCallback, ImportedFile};
use crate::paths::normalize;

const MISSING_IMPORT: &str = "Can't find stylesheet to import";

/// The import statement highlighted in a grass error report.
static IMPORT_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@(?:import|use|forward)\s+["']([^"']+)["']"#).unwrap());

/// The stylesheet named on a grass error trace line (`  path 1:9  root stylesheet`).
static TRACE_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(\S.*?) \d+:\d+\s+root stylesheet\s*$").unwrap());

/// Stylesheet compiler backed by grass.
pub struct GrassCompiler {
    runtime: Arc<dyn SystemRuntime>,
}

impl GrassCompiler {
    pub fn new(runtime: Arc<dyn SystemRuntime>) -> Self {
        Self { runtime }
    }
}

impl Debug for GrassCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrassCompiler")
            .field("runtime", &"<SystemRuntime>")
            .finish()
    }
}

impl StyleCompiler for GrassCompiler {
    fn name(&self) -> &'static str {
        "grass"
    }

    fn compile(
        &self,
        request: &CompileRequest<'_>,
        imports: &mut dyn ImportCallback,
    ) -> Result<CompileOutput, StyleError> {
        let fs = ImporterFs::new(self.runtime.as_ref(), request, imports);

        let unsupported = request.options.unsupported_by_grass();
        if !unsupported.is_empty() {
            debug!(options = ?unsupported, "grass ignores these compiler options");
        }

        let result = {
            let options = grass_options(request.entry, request.options).fs(&fs);
            grass::from_path(request.entry, &options)
        };

        let (included, failure, last_miss) = fs.finish();
        if let Some(err) = failure {
            return Err(err);
        }

        match result {
            Ok(css) => Ok(CompileOutput {
                css,
                included_files: included,
            }),
            Err(e) => {
                let mut read = vec![request.entry.to_path_buf()];
                read.extend(included);
                Err(map_grass_error(&e.to_string(), &read, last_miss.as_deref()))
            }
        }
    }
}

fn grass_options<'a>(entry: &Path, options: &'a CompilerOptions) -> Options<'a> {
    let style = match options.output_style {
        Some(OutputStyle::Compressed | OutputStyle::Compact) => GrassStyle::Compressed,
        _ => GrassStyle::Expanded,
    };

    let mut grass_options = Options::default()
        .style(style)
        .load_paths(options.include_paths.as_slice());
    if let Some(syntax) = input_syntax(entry, options.indented_syntax) {
        grass_options = grass_options.input_syntax(syntax);
    }
    grass_options
}

/// Syntax of the entry point. `None` lets grass decide by extension.
fn input_syntax(entry: &Path, indented: bool) -> Option<InputSyntax> {
    if indented {
        return Some(InputSyntax::Sass);
    }
    let ext = entry.extension()?.to_string_lossy().to_ascii_lowercase();
    match ext.as_str() {
        "sass" => Some(InputSyntax::Sass),
        "css" => Some(InputSyntax::Css),
        _ => None,
    }
}

/// Turn a grass error into a `StyleError`. `read` lists the files grass read,
/// entry first.
fn map_grass_error(message: &str, read: &[PathBuf], last_miss: Option<&Path>) -> StyleError {
    let entry = read.first().cloned().unwrap_or_default();
    if !message.contains(MISSING_IMPORT) {
        return StyleError::Compile {
            file: entry,
            message: message.to_string(),
        };
    }

    let reference = IMPORT_REFERENCE
        .captures(message)
        .map_or_else(|| message.to_string(), |caps| caps[1].to_string());
    let importer = traced_file(message, read)
        .or_else(|| probing_file(&reference, read, last_miss))
        .unwrap_or(entry);
    StyleError::ImportResolution {
        reference,
        importer,
    }
}

/// The file named on the error trace, if grass read it.
fn traced_file(message: &str, read: &[PathBuf]) -> Option<PathBuf> {
    let name = Path::new(TRACE_FILE.captures(message)?.get(1)?.as_str());
    let entry_dir = read.first()?.parent().unwrap_or(Path::new(""));
    let file = normalize(&entry_dir.join(name));
    read.iter().find(|f| **f == file).cloned()
}

/// The latest read file the failed probe `last_miss` could have come from:
/// one whose directory, joined with the reference's directory, contains the
/// probed candidate for the reference's name.
fn probing_file(reference: &str, read: &[PathBuf], last_miss: Option<&Path>) -> Option<PathBuf> {
    let last_miss = last_miss?;
    let reference = Path::new(reference);
    let name = reference.file_name()?.to_string_lossy().into_owned();
    let partial = format!("_{}", name);
    let ref_dir = reference.parent().unwrap_or(Path::new(""));

    read.iter()
        .rev()
        .find(|file| {
            let Some(dir) = file.parent() else {
                return false;
            };
            let Ok(rest) = last_miss.strip_prefix(dir.join(ref_dir)) else {
                return false;
            };
            rest.components().next().is_some_and(|first| {
                let first = first.as_os_str().to_string_lossy();
                first.starts_with(&name) || first.starts_with(&partial)
            })
        })
        .cloned()
}

/// `grass::Fs` adapter routing every probe through an import callback.
struct ImporterFs<'a> {
    runtime: &'a dyn SystemRuntime,
    entry: &'a Path,
    source: &'a str,
    imports: RefCell<&'a mut dyn ImportCallback>,
    loaded: RefCell<HashMap<PathBuf, ImportedFile>>,
    included: RefCell<Vec<PathBuf>>,
    failure: RefCell<Option<StyleError>>,
    last_miss: RefCell<Option<PathBuf>>,
}

impl<'a> ImporterFs<'a> {
    fn new(
        runtime: &'a dyn SystemRuntime,
        request: &CompileRequest<'a>,
        imports: &'a mut dyn ImportCallback,
    ) -> Self {
        Self {
            runtime,
            entry: request.entry,
            source: request.source,
            imports: RefCell::new(imports),
            loaded: RefCell::new(HashMap::new()),
            included: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
            last_miss: RefCell::new(None),
        }
    }

    /// Ask the callback for `path`, caching hits. Unresolved candidates are
    /// normal while grass probes; any other error is kept for later.
    fn probe(&self, path: &Path) -> bool {
        if self.loaded.borrow().contains_key(path) {
            return true;
        }
        if self.failure.borrow().is_some() {
            return false;
        }

        let result = self
            .imports
            .borrow_mut()
            .import(&path.to_string_lossy(), None);
        match result {
            Ok(imported) => {
                self.loaded.borrow_mut().insert(path.to_path_buf(), imported);
                true
            }
            Err(StyleError::ImportResolution { .. }) => {
                *self.last_miss.borrow_mut() = Some(path.to_path_buf());
                false
            }
            Err(e) => {
                *self.failure.borrow_mut() = Some(e);
                false
            }
        }
    }

    fn finish(self) -> (Vec<PathBuf>, Option<StyleError>, Option<PathBuf>) {
        (
            self.included.into_inner(),
            self.failure.into_inner(),
            self.last_miss.into_inner(),
        )
    }
}

impl Debug for ImporterFs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImporterFs")
            .field("entry", &self.entry)
            .field("loaded", &self.loaded.borrow().len())
            .finish()
    }
}

impl grass::Fs for ImporterFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        self.runtime.is_dir(path).unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        path == self.entry || self.probe(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        if path == self.entry {
            return Ok(self.source.as_bytes().to_vec());
        }

        if !self.probe(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: {}", MISSING_IMPORT, path.display()),
            ));
        }

        let loaded = self.loaded.borrow();
        let imported = loaded
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))?;
        self.included.borrow_mut().push(imported.file.clone());
        Ok(imported.contents.as_bytes().to_vec())
    }
}
