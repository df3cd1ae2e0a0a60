//! Which module ids the plugin handles.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::StyleError;
use crate::paths::has_style_extension;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Include/exclude filter over module ids.
///
/// An id is handled when it matches an include pattern (or, with no include
/// patterns, carries a stylesheet extension) and matches no exclude pattern.
/// Patterns that are neither absolute nor start with `*` are taken relative
/// to the working directory. Virtual ids (leading `\0`) are never handled.
#[derive(Debug, Clone, Default)]
pub struct StyleFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl StyleFilter {
    pub fn new(include: &[String], exclude: &[String], cwd: &Path) -> Result<Self, StyleError> {
        Ok(Self {
            include: compile_patterns(include, cwd)?,
            exclude: compile_patterns(exclude, cwd)?,
        })
    }

    pub fn handles(&self, id: &Path) -> bool {
        if id.to_string_lossy().starts_with('\0') {
            return false;
        }

        let included = if self.include.is_empty() {
            has_style_extension(id)
        } else {
            self.include
                .iter()
                .any(|p| p.matches_path_with(id, MATCH_OPTIONS))
        };

        included
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_path_with(id, MATCH_OPTIONS))
    }
}

fn compile_patterns(patterns: &[String], cwd: &Path) -> Result<Vec<Pattern>, StyleError> {
    patterns
        .iter()
        .map(|raw| {
            let anchored = anchor(raw, cwd);
            Pattern::new(&anchored).map_err(|e| StyleError::Config {
                message: format!("invalid glob pattern {:?}: {}", raw, e),
            })
        })
        .collect()
}

fn anchor(pattern: &str, cwd: &Path) -> String {
    if pattern.starts_with('*') || Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let joined: PathBuf = cwd.join(pattern);
        joined.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(include: &[&str], exclude: &[&str]) -> StyleFilter {
        let include: Vec<String> = include.iter().map(|s| s.to_string()).collect();
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        StyleFilter::new(&include, &exclude, Path::new("/proj")).unwrap()
    }

    #[test]
    fn test_default_handles_style_extensions() {
        let f = filter(&[], &[]);
        assert!(f.handles(Path::new("/proj/src/main.scss")));
        assert!(f.handles(Path::new("/proj/src/old.SASS")));
        assert!(f.handles(Path::new("/proj/src/reset.css")));
        assert!(!f.handles(Path::new("/proj/src/index.js")));
        assert!(!f.handles(Path::new("\0virtual.scss")));
    }

    #[test]
    fn test_exclude_patterns() {
        let f = filter(&[], &["**/vendor/**", "src/legacy.scss"]);
        assert!(f.handles(Path::new("/proj/src/main.scss")));
        assert!(!f.handles(Path::new("/proj/node_modules/vendor/x/base.scss")));
        assert!(!f.handles(Path::new("/proj/src/legacy.scss")));
        assert!(f.handles(Path::new("/other/src/legacy.scss")));
    }

    #[test]
    fn test_explicit_include() {
        let f = filter(&["**/*.scss"], &[]);
        assert!(f.handles(Path::new("/proj/a/b/main.scss")));
        assert!(!f.handles(Path::new("/proj/a/b/reset.css")));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = StyleFilter::new(&[], &["[".to_string()], Path::new("/proj")).unwrap_err();
        assert!(matches!(err, StyleError::Config { .. }));
    }
}
