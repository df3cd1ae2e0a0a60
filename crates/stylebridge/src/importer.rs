//! Import resolution for the stylesheet compiler.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The compiler asks for every `@import`/`@use` through an [`ImportCallback`].
//! [`ImportResolver`] answers those requests: it resolves the reference
//! against the requesting file's directory, reads the file, rebases its
//! `url(...)` references onto the entry point's directory (imports are
//! flattened into the entry's output), and records the file in the build's
//! watch set. User importers from the configuration are consulted after the
//! built-in resolution, first non-empty answer wins.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stylebridge_runtime::SystemRuntime;
use tracing::debug;

use crate::error::StyleError;
use crate::paths::{STYLE_EXTENSIONS, normalize};
use crate::rebase::rebase;
use crate::registry::WatchSet;
use crate::resolver::ModuleResolver;

/// A resolved import: the file it came from and the text to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFile {
    pub file: PathBuf,
    pub contents: String,
}

impl ImportedFile {
    pub fn new(file: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            contents: contents.into(),
        }
    }
}

/// A user-supplied importer.
///
/// Receives the import reference and the requesting file. `Ok(None)` means
/// "not mine, ask the next importer"; an `Err` fails the compile.
pub trait Importer: Send + Sync {
    fn import(&self, url: &str, prev: &Path) -> ImporterResult;
}

/// Result of a single user importer.
pub type ImporterResult = Result<Option<ImportedFile>, StyleError>;

impl<F> Importer for F
where
    F: Fn(&str, &Path) -> ImporterResult + Send + Sync,
{
    fn import(&self, url: &str, prev: &Path) -> ImporterResult {
        self(url, prev)
    }
}

impl fmt::Debug for dyn Importer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<importer>")
    }
}

/// Callback the compiler uses to load imported stylesheets.
///
/// `prev` is the file containing the import, or `None` for the top-level
/// source (inline `data` has no file of its own).
pub trait ImportCallback {
    fn import(&mut self, url: &str, prev: Option<&Path>) -> Result<ImportedFile, StyleError>;
}

/// Built-in import handling for one entry point's compilation.
pub struct ImportResolver<'a> {
    runtime: &'a dyn SystemRuntime,
    resolver: &'a dyn ModuleResolver,
    importers: &'a [Arc<dyn Importer>],
    entry: PathBuf,
    base_dir: PathBuf,
    watch: WatchSet,
}

impl<'a> ImportResolver<'a> {
    /// Create a resolver for `entry`. Top-level imports resolve from the
    /// entry's directory, which is also the rebase destination.
    pub fn new(
        runtime: &'a dyn SystemRuntime,
        resolver: &'a dyn ModuleResolver,
        importers: &'a [Arc<dyn Importer>],
        entry: &Path,
    ) -> Self {
        let entry = normalize(entry);
        let base_dir = entry.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            runtime,
            resolver,
            importers,
            entry,
            base_dir,
            watch: WatchSet::new(),
        }
    }

    /// Files resolved so far.
    pub fn watch_set(&self) -> &WatchSet {
        &self.watch
    }

    pub fn into_watch_set(self) -> WatchSet {
        self.watch
    }

    fn load_builtin(&self, url: &str, dir: &Path) -> ImporterResult {
        let Some(file) = self.resolver.resolve(&dir.join(url), &STYLE_EXTENSIONS) else {
            return Ok(None);
        };
        let contents = self
            .runtime
            .file_read_string(&file)
            .map_err(|e| StyleError::read(&file, e))?;
        let file_dir = file.parent().unwrap_or(dir);
        let contents = rebase(&contents, file_dir, &self.base_dir).into_owned();
        Ok(Some(ImportedFile { file, contents }))
    }
}

impl fmt::Debug for ImportResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportResolver")
            .field("entry", &self.entry)
            .field("importers", &self.importers.len())
            .field("watch", &self.watch)
            .finish()
    }
}

impl ImportCallback for ImportResolver<'_> {
    fn import(&mut self, url: &str, prev: Option<&Path>) -> Result<ImportedFile, StyleError> {
        let dir = prev
            .and_then(Path::parent)
            .map_or_else(|| self.base_dir.clone(), Path::to_path_buf);
        let requester = prev.map_or_else(|| self.entry.clone(), Path::to_path_buf);

        let mut found = self.load_builtin(url, &dir)?;
        if found.is_none() {
            for importer in self.importers {
                if let Some(imported) = importer.import(url, &requester)? {
                    found = Some(imported);
                    break;
                }
            }
        }

        match found {
            Some(imported) => {
                debug!(url, file = %imported.file.display(), "resolved import");
                self.watch.insert(imported.file.clone());
                Ok(imported)
            }
            None => Err(StyleError::ImportResolution {
                reference: url.to_string(),
                importer: requester,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::RuntimeResolver;
    use std::fs;
    use stylebridge_runtime::NativeRuntime;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, contents: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_nested_import_is_rebased_to_entry_dir() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let entry = write(root, "src/main.scss", "@import 'parts/icons';");
        let icons = write(
            root,
            "src/parts/_icons.scss",
            ".icon { background: url(\"img/i.png\"); }",
        );

        let runtime = NativeRuntime::new();
        let resolver = RuntimeResolver::new(&runtime);
        let mut imports = ImportResolver::new(&runtime, &resolver, &[], &entry);

        let imported = imports.import("parts/icons", Some(&entry)).unwrap();
        assert_eq!(imported.file, icons);
        assert_eq!(
            imported.contents,
            ".icon { background: url('parts/img/i.png'); }"
        );
        assert!(imports.watch_set().contains(&icons));
    }

    #[test]
    fn test_top_level_request_uses_entry_dir() {
        let temp = TempDir::new().unwrap();
        let entry = temp.path().join("src/main.scss");
        let vars = write(temp.path(), "src/_vars.scss", "$c: red;");

        let runtime = NativeRuntime::new();
        let resolver = RuntimeResolver::new(&runtime);
        let mut imports = ImportResolver::new(&runtime, &resolver, &[], &entry);

        assert_eq!(imports.import("vars", None).unwrap().file, vars);
    }

    #[test]
    fn test_user_importer_consulted_after_builtin() {
        let temp = TempDir::new().unwrap();
        let entry = write(temp.path(), "main.scss", "");

        let skip: Arc<dyn Importer> = Arc::new(|_: &str, _: &Path| -> ImporterResult { Ok(None) });
        let theme: Arc<dyn Importer> = Arc::new(|url: &str, _: &Path| -> ImporterResult {
            Ok((url == "theme:dark").then(|| ImportedFile::new("/virtual/dark.scss", "$bg: #000;")))
        });
        let importers = vec![skip, theme];

        let runtime = NativeRuntime::new();
        let resolver = RuntimeResolver::new(&runtime);
        let mut imports = ImportResolver::new(&runtime, &resolver, &importers, &entry);

        let imported = imports.import("theme:dark", Some(&entry)).unwrap();
        assert_eq!(imported.contents, "$bg: #000;");
        assert!(imports.watch_set().contains(Path::new("/virtual/dark.scss")));
    }

    #[test]
    fn test_importer_error_propagates() {
        let temp = TempDir::new().unwrap();
        let entry = write(temp.path(), "main.scss", "");
        let failing: Arc<dyn Importer> = Arc::new(|_: &str, _: &Path| -> ImporterResult {
            Err(StyleError::importer("registry offline"))
        });
        let importers = vec![failing];

        let runtime = NativeRuntime::new();
        let resolver = RuntimeResolver::new(&runtime);
        let mut imports = ImportResolver::new(&runtime, &resolver, &importers, &entry);

        let err = imports.import("remote", Some(&entry)).unwrap_err();
        assert!(matches!(err, StyleError::Importer { .. }));
    }

    #[test]
    fn test_unresolved_names_reference_and_requester() {
        let temp = TempDir::new().unwrap();
        let entry = write(temp.path(), "main.scss", "");

        let runtime = NativeRuntime::new();
        let resolver = RuntimeResolver::new(&runtime);
        let mut imports = ImportResolver::new(&runtime, &resolver, &[], &entry);

        match imports.import("nope", Some(&entry)) {
            Err(StyleError::ImportResolution {
                reference,
                importer,
            }) => {
                assert_eq!(reference, "nope");
                assert_eq!(importer, entry);
            }
            other => panic!("expected ImportResolution, got {:?}", other),
        }
        assert!(imports.watch_set().is_empty());
    }
}
