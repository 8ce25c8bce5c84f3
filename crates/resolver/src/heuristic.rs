//! Load-path based resolution, used when the name-location service cannot
//! answer.

use crate::paths::{normalize_lexically, relative_to};
use crate::project::LoadPathEntry;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Locate the source file for `name` using the load-path mappings.
///
/// Returns a path relative to `root`.
pub(crate) fn locate(
    root: &Path,
    mappings: &[&LoadPathEntry],
    name: &str,
    extension: &str,
) -> Option<PathBuf> {
    let parts: Vec<&str> = name.split('.').filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        return None;
    }

    let (index, prefix_len) = best_mapping(mappings, &parts)?;
    let physical = normalize_lexically(&root.join(&mappings[index].physical));
    let rest = &parts[prefix_len..];

    if rest.is_empty() {
        if physical.is_dir() {
            // The prefix names a directory, not a module: try the other mappings.
            let remaining: Vec<&LoadPathEntry> = mappings
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, entry)| *entry)
                .collect();
            return locate(root, &remaining, name, extension);
        }
        return physical.is_file().then(|| relative_to(&physical, root));
    }

    let direct = module_file(&physical, rest, extension);
    if direct.is_file() {
        return Some(relative_to(&direct, root));
    }

    // The last segment is most likely a definition inside its module.
    let candidate = if rest.len() > 1 {
        let container = module_file(&physical, &rest[..rest.len() - 1], extension);
        if container.is_file() {
            return Some(relative_to(&container, root));
        }
        container
    } else {
        direct
    };

    let file_name = candidate.file_name()?.to_os_string();
    let start = candidate
        .parent()
        .filter(|dir| dir.is_dir())
        .unwrap_or(physical.as_path());
    search_subtree(start, &file_name)
        .or_else(|| {
            (start != physical.as_path())
                .then(|| search_subtree(&physical, &file_name))
                .flatten()
        })
        .map(|found| relative_to(&found, root))
}

/// Longest matching logical prefix; the first registered mapping wins ties.
fn best_mapping(mappings: &[&LoadPathEntry], parts: &[&str]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for (index, entry) in mappings.iter().enumerate() {
        let Some(len) = entry.prefix_len(parts) else {
            continue;
        };
        if best.map_or(true, |(_, best_len)| len > best_len) {
            best = Some((index, len));
        }
    }
    best
}

fn module_file(physical: &Path, segments: &[&str], extension: &str) -> PathBuf {
    let mut path = physical.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    let mut file_name = path.file_name().map(OsString::from).unwrap_or_default();
    file_name.push(".");
    file_name.push(extension);
    path.set_file_name(file_name);
    path
}

/// First file named `file_name` below `dir`, visiting entries in name order
fn search_subtree(dir: &Path, file_name: &OsString) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }
    WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_type().is_file() && entry.file_name() == file_name.as_os_str())
        .map(walkdir::DirEntry::into_path)
}
