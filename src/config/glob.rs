//! Glob expansion for source patterns.
//!
//! Supports `*` and `?` within a path segment and `**` for any number of
//! directories. Wildcards don't match a leading `.`, so hidden files are
//! skipped unless the pattern names them. Results are sorted so that repeated
//! runs over an unchanged tree produce the same order.

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

/// Whether a string contains glob metacharacters.
pub fn is_pattern(s: &str) -> bool {
    s.contains(['*', '?'])
}

/// Expand an absolute glob pattern into the matching paths (files and directories).
pub fn expand(pattern: &Path) -> Vec<PathBuf> {
    let components: Vec<String> = pattern
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let Some(first_wild) = components.iter().position(|c| is_pattern(c)) else {
        return if pattern.exists() {
            vec![pattern.to_path_buf()]
        } else {
            vec![]
        };
    };

    let base: PathBuf = pattern.components().take(first_wild).collect();
    let segments: Vec<&str> = components[first_wild..].iter().map(String::as_str).collect();

    if !base.is_dir() {
        return vec![];
    }

    let mut walker = WalkDir::new(&base)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    if !segments.contains(&"**") {
        walker = walker.max_depth(segments.len());
    }

    let mut matches: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| {
            let Ok(relative) = entry.path().strip_prefix(&base) else {
                return false;
            };
            let parts: Vec<String> = relative
                .components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();
            let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
            match_segments(&segments, &parts)
        })
        .map(|entry| entry.into_path())
        .collect();

    matches.sort();
    matches
}

/// Match path segments against pattern segments, with `**` spanning any
/// number of segments.
fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&"**", rest)) => {
            (0..=path.len()).any(|skip| {
                path[..skip].iter().all(|p| !p.starts_with('.')) && match_segments(rest, &path[skip..])
            })
        }
        Some((segment, rest)) => match path.split_first() {
            Some((part, path_rest)) => match_segment(segment, part) && match_segments(rest, path_rest),
            None => false,
        },
    }
}

/// Match a single path segment against a pattern segment.
pub fn match_segment(pattern: &str, name: &str) -> bool {
    if name.starts_with('.') && !pattern.starts_with('.') {
        return false;
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    match_chars(&pattern, &name)
}

fn match_chars(pattern: &[char], name: &[char]) -> bool {
    match pattern.split_first() {
        None => name.is_empty(),
        Some(('*', rest)) => (0..=name.len()).any(|skip| match_chars(rest, &name[skip..])),
        Some(('?', rest)) => !name.is_empty() && match_chars(rest, &name[1..]),
        Some((c, rest)) => name.first() == Some(c) && match_chars(rest, &name[1..]),
    }
}
