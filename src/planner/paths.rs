//! Path helpers shared by discovery and the diff engine.
//!
//! Resource paths are POSIX style with a leading `/`. The remote side hands
//! out ids with escaped separators and the application name in front; these
//! helpers bring both sides into one namespace.

use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Escaped path separator used in remote resource ids.
const ESCAPED_SEPARATOR: &str = "%2f";

/// Number of leading segments that make up the deployment root.
///
/// `"/index.html".split('/')` yields two segments, so nothing at the root
/// level produces a folder.
pub const DEFAULT_ROOT_DEPTH: usize = 2;

/// Converts a remote resource id into a local relative path.
///
/// Every escaped separator is replaced by `/` (case-insensitively), then the
/// leading `app_prefix` is stripped. Ids that do not start with the prefix
/// keep their full path.
#[must_use]
pub fn normalize_remote_path(raw: &str, app_prefix: &str) -> String {
    let decoded = unescape_separators(raw);
    match decoded.strip_prefix(app_prefix) {
        Some(rest) if !app_prefix.is_empty() => rest.to_string(),
        _ => decoded,
    }
}

fn unescape_separators(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = find_ascii_case_insensitive(rest, ESCAPED_SEPARATOR) {
        out.push_str(&rest[..pos]);
        out.push('/');
        rest = &rest[pos + ESCAPED_SEPARATOR.len()..];
    }
    out.push_str(rest);
    out
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Number of `/`-separated segments, counting the empty one before a leading `/`.
#[must_use]
pub fn segment_count(path: &str) -> usize {
    path.split('/').count()
}

/// Orders paths shallowest-first, lexical within a depth.
#[must_use]
pub fn shallow_first(a: &str, b: &str) -> Ordering {
    segment_count(a)
        .cmp(&segment_count(b))
        .then_with(|| a.cmp(b))
}

/// Orders paths deepest-first, lexical within a depth.
#[must_use]
pub fn deep_first(a: &str, b: &str) -> Ordering {
    segment_count(b)
        .cmp(&segment_count(a))
        .then_with(|| a.cmp(b))
}

/// Sorts paths shallowest-first.
pub fn sort_shallow_first(paths: &mut [String]) {
    paths.sort_by(|a, b| shallow_first(a, b));
}

/// Derives the set of folders implied by a list of file paths.
///
/// Each file contributes every ancestor prefix that still has more than
/// `root_depth` segments. The result is deduplicated and has no fixed order.
#[must_use]
pub fn derive_local_folders<'a, I>(files: I, root_depth: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut folders = BTreeSet::new();

    for file in files {
        let mut parts: Vec<&str> = file.split('/').collect();
        while parts.len() > root_depth {
            parts.pop();
            folders.insert(parts.join("/"));
        }
    }

    folders.into_iter().collect()
}
