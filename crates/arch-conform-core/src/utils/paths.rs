//! Path utilities for package paths and file paths.
//!
//! Package paths are `/`-separated (Go import paths). File paths are
//! converted to the same form before matching so results do not depend on
//! the host platform.

use std::path::{Component, Path};

/// Converts a relative file path to a `/`-separated string.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `/`-separated directory of a relative file path (empty for root files).
#[must_use]
pub fn parent_dir(path: &Path) -> String {
    path.parent().map(to_slash).unwrap_or_default()
}

/// Checks whether any directory segment of `path` equals `segment`.
///
/// The file name itself is not considered, and partial matches such as
/// `cmdb` for `cmd` do not count.
#[must_use]
pub fn has_dir_segment(path: &Path, segment: &str) -> bool {
    path.parent().is_some_and(|dir| {
        dir.components()
            .any(|c| matches!(c, Component::Normal(s) if s.to_str() == Some(segment)))
    })
}

/// Checks whether `path` equals `prefix` or lies below it, segment-wise.
///
/// # Examples
///
/// ```ignore
/// assert!(is_under("internal/domain/user", "internal/domain"));
/// assert!(!is_under("internal/domains", "internal/domain"));
/// ```
#[must_use]
pub fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Checks if a package path matches a pattern.
///
/// Supports wildcards:
/// - `*` matches any single segment
/// - `**` matches any number of segments
///
/// # Examples
///
/// ```ignore
/// assert!(path_matches("database/sql", "database/*"));
/// assert!(path_matches("github.com/lib/pq/oid", "github.com/lib/**"));
/// assert!(!path_matches("net/http", "database/*"));
/// ```
#[must_use]
pub fn path_matches(path: &str, pattern: &str) -> bool {
    let path_parts: Vec<&str> = path.split('/').collect();
    let pattern_parts: Vec<&str> = pattern.split('/').collect();

    match_parts(&path_parts, &pattern_parts)
}

fn match_parts(path: &[&str], pattern: &[&str]) -> bool {
    let Some((first_pattern, rest_pattern)) = pattern.split_first() else {
        return path.is_empty();
    };

    match *first_pattern {
        "**" => (0..=path.len()).any(|i| match_parts(&path[i..], rest_pattern)),
        "*" => !path.is_empty() && match_parts(&path[1..], rest_pattern),
        literal => path.first() == Some(&literal) && match_parts(&path[1..], rest_pattern),
    }
}
