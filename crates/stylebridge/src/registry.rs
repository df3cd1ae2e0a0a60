//! Per-build storage of compiled stylesheets.
//!
//! Copyright (c) 2025 Posit, PBC

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// One compiled stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleUnit {
    /// Absolute path of the entry point; the registry key.
    pub source_path: PathBuf,
    /// Directory `url(...)` references in `css` are relative to.
    pub source_dir: PathBuf,
    /// Compiled CSS, not yet rebased.
    pub css: String,
}

impl StyleUnit {
    /// Create a unit whose rebase origin is the source file's directory.
    pub fn new(source_path: impl Into<PathBuf>, css: impl Into<String>) -> Self {
        let source_path = source_path.into();
        let source_dir = source_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            source_path,
            source_dir,
            css: css.into(),
        }
    }
}

/// Mapping from source path to its most recent compilation.
///
/// Not synchronized: a registry belongs to exactly one build session.
#[derive(Debug, Default, Clone)]
pub struct StyleRegistry {
    units: BTreeMap<PathBuf, StyleUnit>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `unit` under `source_path`, replacing any earlier compile.
    pub fn put(&mut self, source_path: impl Into<PathBuf>, unit: StyleUnit) {
        self.units.insert(source_path.into(), unit);
    }

    pub fn get(&self, source_path: &Path) -> Option<&StyleUnit> {
        self.units.get(source_path)
    }

    /// All units, sorted by source path.
    pub fn all(&self) -> impl Iterator<Item = &StyleUnit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn clear(&mut self) {
        self.units.clear();
    }
}

/// Files consumed by compilation, reported to the host for watching.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WatchSet {
    files: BTreeSet<PathBuf>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file. Returns `true` if it was not already present.
    pub fn insert(&mut self, file: impl Into<PathBuf>) -> bool {
        self.files.insert(file.into())
    }

    pub fn contains(&self, file: &Path) -> bool {
        self.files.contains(file)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn extend(&mut self, other: WatchSet) {
        self.files.extend(other.files);
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for WatchSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().map(Into::into).collect(),
        }
    }
}
