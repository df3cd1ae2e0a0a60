//! Asset URL rebasing.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Compiled CSS refers to images and fonts with `url(...)` references that are
//! relative to the stylesheet they were written in. Once that CSS is merged
//! into a bundle or written to an output directory, every relative reference
//! has to be recomputed against the new location.
//!
//! ```text
//! source dir:  /proj/src/styles      url(images/x.png)
//! destination: /proj/dist            url('../src/styles/images/x.png')
//! ```
//!
//! Only local relative paths are rewritten. Absolute paths, anything with a
//! URL scheme (`http:`, `data:`, ...), fragment references (`#id`) and Sass
//! expressions (`$var`, `#{...}`) are left exactly as written.

use std::borrow::Cow;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::paths::{normalize, relative_to, to_slash};

/// `url(...)` references, case-insensitive. The argument runs to the first
/// closing parenthesis, so parentheses inside a URL are not supported.
static CSS_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)url\(([^)]*)\)").unwrap());

/// A leading URL scheme such as `http:`, `data:` or `blob:`.
static URL_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").unwrap());

/// Rewrite relative `url(...)` references in `css` from `origin_dir` to
/// `destination_dir`.
///
/// Rewritten references are always emitted as `url('<path>')` with forward
/// slashes, also when both directories are the same, so output that is
/// already in that form comes back unchanged. With different directories
/// rebasing is not idempotent: apply it once per artifact, right before the
/// text is written or merged.
pub fn rebase<'a>(css: &'a str, origin_dir: &Path, destination_dir: &Path) -> Cow<'a, str> {
    let origin = normalize(origin_dir);
    let destination = normalize(destination_dir);

    CSS_URL.replace_all(css, |caps: &Captures<'_>| {
        let asset = strip_quotes(&caps[1]);
        if !is_rebaseable(asset) {
            return caps[0].to_string();
        }
        let absolute = origin.join(asset);
        let relative = relative_to(&destination, &absolute);
        format!("url('{}')", to_slash(&relative))
    })
}

/// Remove every quote character and surrounding whitespace from a `url()`
/// argument.
fn strip_quotes(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

/// Whether a `url()` argument is a local relative filesystem path.
pub fn is_rebaseable(asset: &str) -> bool {
    if asset.is_empty() {
        return false;
    }
    if asset.starts_with('/') || asset.starts_with('\\') || Path::new(asset).is_absolute() {
        return false;
    }
    if asset.starts_with('#') || asset.starts_with('$') {
        return false;
    }
    !URL_SCHEME.is_match(asset)
}
