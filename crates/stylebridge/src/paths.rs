//! Lexical path helpers shared by the rebaser, resolver and emitter.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Nothing here touches the filesystem: paths are cleaned and compared by
//! their components only, so results are stable for files that do not
//! exist yet (output destinations) and are not affected by symlinks.

use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

/// Recognized stylesheet extensions, in import preference order.
pub const STYLE_EXTENSIONS: [&str; 3] = [".scss", ".sass", ".css"];

/// A trailing file extension of two to four letters.
static FILE_EXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.[a-z]{2,4}$").unwrap());

/// Collapse `.` and `..` components without consulting the filesystem.
///
/// `..` at the root is dropped; leading `..` in a relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Compute `target` relative to the directory `base`.
///
/// Both paths are normalized first. When the two paths live under different
/// roots (e.g. different Windows drives) the normalized target is returned.
pub fn relative_to(base: &Path, target: &Path) -> PathBuf {
    let base = normalize(base);
    let target = normalize(target);

    let base_parts: Vec<Component<'_>> = base.components().collect();
    let target_parts: Vec<Component<'_>> = target.components().collect();

    let different_prefix = matches!(
        (base_parts.first(), target_parts.first()),
        (Some(Component::Prefix(a)), Some(Component::Prefix(b))) if a != b
    );
    if different_prefix || base.has_root() != target.has_root() {
        return target;
    }

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }
    relative
}

/// Render a path with forward slashes regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Whether the path ends in one of [`STYLE_EXTENSIONS`] (case-insensitive).
pub fn has_style_extension(path: &Path) -> bool {
    let name = path.to_string_lossy().to_ascii_lowercase();
    STYLE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// File name used for a unit in directory mode: base name with its
/// extension replaced by `.css`.
pub fn css_file_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    replace_extension(&name)
}

/// Destination for merged-file mode.
///
/// Stylesheet extensions are kept as given, any other short extension is
/// swapped for `.css`, and a bare name gets `.css` appended.
pub fn merged_destination(dest: &Path) -> PathBuf {
    if has_style_extension(dest) {
        return dest.to_path_buf();
    }
    let file_name = match dest.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return dest.join("bundle.css"),
    };
    dest.with_file_name(replace_extension(&file_name))
}

fn replace_extension(file_name: &str) -> String {
    if FILE_EXT.is_match(file_name) {
        FILE_EXT.replace(file_name, ".css").into_owned()
    } else {
        format!("{}.css", file_name)
    }
}
