//! Output emission: turning the registry into build artifacts.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Exactly one [`OutputTarget`] is active per build:
//!
//! - **Merged file**: every unit rebased onto the destination's directory and
//!   concatenated in source-path order, written once.
//! - **Directory**: one `<base name>.css` per unit inside the output directory.
//! - **Inline**: the merged text replaces a stylesheet asset the bundler is
//!   already emitting; nothing is written here.
//!
//! Directory creation happens first, then all writes are issued at once.
//! Each write succeeds or fails on its own: a failure is logged and recorded
//! in the [`EmitReport`] but never stops sibling writes or fails the build.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::thread;

use stylebridge_runtime::SystemRuntime;
use tracing::{error, info, warn};

use crate::config::PluginConfig;
use crate::error::FilesystemError;
use crate::paths::{css_file_name, has_style_extension, merged_destination, normalize, relative_to};
use crate::rebase::rebase;
use crate::registry::StyleRegistry;

/// Output options of the host bundler, used when the plugin config names no
/// destination of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub dir: Option<PathBuf>,
    pub file: Option<PathBuf>,
}

/// An asset in the bundler's in-memory output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleAsset {
    pub code: String,
}

impl BundleAsset {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// The bundler's output, keyed by asset file name.
pub type Bundle = BTreeMap<String, BundleAsset>;

/// Where compiled styles go for this build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One merged stylesheet at this path.
    MergedFile(PathBuf),
    /// One stylesheet per entry point inside this directory.
    Directory(PathBuf),
    /// Replace the content of bundle asset `asset`. URLs are rebased onto
    /// the directory of `destination`.
    Inline { asset: String, destination: PathBuf },
    /// Nothing configured: no output.
    None,
}

impl OutputTarget {
    /// Pick the target from the plugin config, falling back to the
    /// bundler's own output options. Relative paths resolve against `cwd`.
    ///
    /// Inline mode depends only on the bundler's `file`: when it names a
    /// stylesheet the bundle already contains, that asset is replaced. A
    /// configured `out_file` never selects inline mode on its own.
    pub fn select(
        config: &PluginConfig,
        output: &OutputOptions,
        bundle: &Bundle,
        cwd: &Path,
    ) -> Self {
        if let Some(dir) = config.out_dir.as_ref().or(output.dir.as_ref()) {
            return OutputTarget::Directory(normalize(&cwd.join(dir)));
        }

        let Some(file) = config.out_file.as_ref().or(output.file.as_ref()) else {
            return OutputTarget::None;
        };
        let file = normalize(&cwd.join(file));

        if let Some(asset) = output.file.as_deref().and_then(|f| bundled_stylesheet(f, bundle)) {
            return OutputTarget::Inline {
                asset,
                destination: file,
            };
        }

        OutputTarget::MergedFile(merged_destination(&file))
    }
}

/// Name of the bundle asset the bundler writes to `file`, if that asset is a
/// stylesheet already present in the bundle.
fn bundled_stylesheet(file: &Path, bundle: &Bundle) -> Option<String> {
    if !has_style_extension(file) {
        return None;
    }
    let asset = file.file_name()?.to_string_lossy().into_owned();
    bundle.contains_key(&asset).then_some(asset)
}

/// Result of one file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub path: PathBuf,
    /// Bytes written, or why the write failed.
    pub result: Result<u64, FilesystemError>,
}

/// Everything finalization did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitReport {
    pub target: OutputTarget,
    /// File writes, sorted by path.
    pub writes: Vec<WriteOutcome>,
    /// Bundle asset whose content was replaced, in inline mode.
    pub inlined: Option<String>,
}

impl EmitReport {
    fn new(target: OutputTarget) -> Self {
        Self {
            target,
            writes: Vec::new(),
            inlined: None,
        }
    }

    /// Paths written successfully.
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.writes
            .iter()
            .filter(|w| w.result.is_ok())
            .map(|w| w.path.as_path())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FilesystemError> {
        self.writes.iter().filter_map(|w| w.result.as_ref().err())
    }

    pub fn is_success(&self) -> bool {
        self.writes.iter().all(|w| w.result.is_ok())
    }
}

/// Format a byte count with 1024-based units.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let size = bytes as f64;
    if size < KB {
        format!("{} B", bytes)
    } else if size < MB {
        format!("{:.2} kB", size / KB)
    } else {
        format!("{:.2} MB", size / MB)
    }
}

/// Writes registry contents to the selected target.
pub struct OutputEmitter<'a> {
    runtime: &'a dyn SystemRuntime,
    /// Base for the paths shown in log lines.
    display_base: PathBuf,
}

impl<'a> OutputEmitter<'a> {
    pub fn new(runtime: &'a dyn SystemRuntime) -> Self {
        let display_base = runtime.cwd().unwrap_or_default();
        Self {
            runtime,
            display_base,
        }
    }

    pub fn emit(
        &self,
        target: &OutputTarget,
        registry: &StyleRegistry,
        bundle: &mut Bundle,
    ) -> EmitReport {
        let mut report = EmitReport::new(target.clone());

        match target {
            OutputTarget::None => {}
            OutputTarget::MergedFile(dest) => {
                let dir = parent_dir(dest);
                let css = merge(registry, &dir);
                report.writes = self.write_all(&dir, vec![(dest.clone(), css)]);
            }
            OutputTarget::Directory(dir) => {
                let files = plan_directory(registry, dir);
                report.writes = self.write_all(dir, files);
            }
            OutputTarget::Inline { asset, destination } => {
                let css = merge(registry, &parent_dir(destination));
                if let Some(entry) = bundle.get_mut(asset) {
                    entry.code = css;
                    report.inlined = Some(asset.clone());
                }
            }
        }

        report
    }

    /// Create `dir`, then write every file concurrently.
    fn write_all(&self, dir: &Path, files: Vec<(PathBuf, String)>) -> Vec<WriteOutcome> {
        if let Err(e) = self.runtime.dir_create(dir, true) {
            let failure = FilesystemError::new(dir, &e);
            error!(path = %dir.display(), code = %failure.code_label(), "failed to create output directory");
            return files
                .into_iter()
                .map(|(path, _)| WriteOutcome {
                    path,
                    result: Err(failure.clone()),
                })
                .collect();
        }

        let mut outcomes: Vec<WriteOutcome> = thread::scope(|scope| {
            let handles: Vec<_> = files
                .into_iter()
                .map(|(path, css)| scope.spawn(move || self.write_one(path, &css)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });
        outcomes.sort_by(|a, b| a.path.cmp(&b.path));
        outcomes
    }

    fn write_one(&self, path: PathBuf, css: &str) -> WriteOutcome {
        let shown = relative_to(&self.display_base, &path);
        let result = match self.runtime.file_write(&path, css.as_bytes()) {
            Ok(()) => {
                let bytes = css.len() as u64;
                info!("created {} ({})", shown.display(), format_size(bytes));
                Ok(bytes)
            }
            Err(e) => {
                let failure = FilesystemError::new(&path, &e);
                error!(path = %shown.display(), code = %failure.code_label(), "failed to write stylesheet");
                Err(failure)
            }
        };
        WriteOutcome { path, result }
    }
}

impl std::fmt::Debug for OutputEmitter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputEmitter")
            .field("runtime", &"<SystemRuntime>")
            .field("display_base", &self.display_base)
            .finish()
    }
}

fn parent_dir(file: &Path) -> PathBuf {
    file.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Concatenate all units, each rebased onto `dir`, in source-path order.
fn merge(registry: &StyleRegistry, dir: &Path) -> String {
    registry
        .all()
        .map(|unit| rebase(&unit.css, &unit.source_dir, dir))
        .collect()
}

/// One `(destination, css)` pair per unit. Units sharing a base name collide;
/// the later source path wins.
fn plan_directory(registry: &StyleRegistry, dir: &Path) -> Vec<(PathBuf, String)> {
    let mut planned: BTreeMap<PathBuf, (PathBuf, String)> = BTreeMap::new();
    for unit in registry.all() {
        let dest = dir.join(css_file_name(&unit.source_path));
        let css = rebase(&unit.css, &unit.source_dir, dir).into_owned();
        if let Some((previous, _)) = planned.insert(dest.clone(), (unit.source_path.clone(), css)) {
            warn!(
                dest = %dest.display(),
                replaced = %previous.display(),
                by = %unit.source_path.display(),
                "output file name collision; last entry point wins"
            );
        }
    }
    planned
        .into_iter()
        .map(|(dest, (_, css))| (dest, css))
        .collect()
}
