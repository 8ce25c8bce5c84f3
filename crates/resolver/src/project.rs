//! Logical load path: the mapping between physical directories and dotted
//! module prefixes, as declared by `-Q`/`-R` lines of a project file.

use crate::error::{ResolveError, Result};
use crate::paths::normalize_lexically;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// One `(physical directory, logical prefix)` mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadPathEntry {
    /// Directory, relative to the project root
    pub physical: PathBuf,

    /// Dotted module prefix; empty maps the directory to the root namespace
    #[serde(default)]
    pub logical: String,
}

impl LoadPathEntry {
    pub fn new(physical: impl Into<PathBuf>, logical: impl Into<String>) -> Self {
        Self {
            physical: physical.into(),
            logical: logical.into(),
        }
    }

    /// Logical prefix split into segments (empty for the root namespace)
    pub fn logical_segments(&self) -> Vec<&str> {
        self.logical
            .trim()
            .trim_matches('"')
            .trim()
            .trim_end_matches('.')
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    /// Number of leading name segments covered by this mapping, if it matches
    pub fn prefix_len(&self, parts: &[&str]) -> Option<usize> {
        let logical = self.logical_segments();
        (parts.len() >= logical.len() && parts[..logical.len()] == logical[..])
            .then_some(logical.len())
    }
}

/// Ordered list of load-path mappings. Registration order breaks ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadPath {
    entries: Vec<LoadPathEntry>,
}

impl LoadPath {
    pub fn new(entries: Vec<LoadPathEntry>) -> Self {
        Self { entries }
    }

    /// Parse `-Q`/`-R` declarations from project file text.
    ///
    /// Blank lines and `#` comments are skipped, other flags are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            if !matches!(tokens[0], "-Q" | "-R") {
                continue;
            }
            let &[_, physical, logical, ..] = tokens.as_slice() else {
                return Err(ResolveError::invalid_project_file(format!(
                    "line {}: expected two arguments after {}",
                    line_no + 1,
                    tokens[0]
                )));
            };
            let logical = if logical == "\"\"" { "" } else { logical };
            entries.push(LoadPathEntry::new(physical, logical));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LoadPathEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: LoadPathEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dotted module name for a project-relative source path.
    ///
    /// The mapping with the longest physical directory containing the file wins.
    pub fn module_name_for(&self, path: &Path) -> Option<String> {
        let file = normalize_lexically(path);

        let (entry, relative) = self
            .entries
            .iter()
            .filter_map(|entry| {
                let physical = normalize_lexically(&entry.physical);
                let relative = if physical.as_os_str().is_empty() {
                    file.clone()
                } else {
                    file.strip_prefix(&physical).ok()?.to_path_buf()
                };
                Some((entry, physical.components().count(), relative))
            })
            .max_by(|a, b| a.1.cmp(&b.1).then(std::cmp::Ordering::Greater))
            .map(|(entry, _, relative)| (entry, relative))?;

        let relative = relative.with_extension("");
        let mut segments: Vec<String> = entry
            .logical_segments()
            .into_iter()
            .map(str::to_string)
            .collect();
        segments.extend(relative.components().filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        }));

        (!segments.is_empty()).then(|| segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_q_and_r_lines() {
        let load_path = LoadPath::parse(
            "# project\n-Q theories MyLib\n\n-R base \"\"\n-arg -w\nsrc/A.v\n",
        )
        .unwrap();

        assert_eq!(
            load_path.entries(),
            &[
                LoadPathEntry::new("theories", "MyLib"),
                LoadPathEntry::new("base", ""),
            ]
        );
    }

    #[test]
    fn rejects_incomplete_mapping() {
        let err = LoadPath::parse("-Q theories\n").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidProjectFile(_)));
    }

    #[test]
    fn prefix_len_matches_whole_segments() {
        let entry = LoadPathEntry::new("theories", "My.Lib");
        assert_eq!(entry.prefix_len(&["My", "Lib", "A"]), Some(2));
        assert_eq!(entry.prefix_len(&["My", "Library"]), None);
        assert_eq!(LoadPathEntry::new(".", "").prefix_len(&["A"]), Some(0));
    }

    #[test]
    fn module_name_uses_longest_physical_match() {
        let load_path = LoadPath::new(vec![
            LoadPathEntry::new(".", ""),
            LoadPathEntry::new("theories", "MyLib"),
        ]);

        assert_eq!(
            load_path.module_name_for(Path::new("./theories/Data/Tuple.v")),
            Some("MyLib.Data.Tuple".to_string())
        );
        assert_eq!(
            load_path.module_name_for(Path::new("Main.v")),
            Some("Main".to_string())
        );
    }
}
