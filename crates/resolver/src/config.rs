use crate::error::{ResolveError, Result};
use crate::project::{LoadPath, LoadPathEntry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for qualified-name resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Directory every resolved path is made relative to
    pub project_root: PathBuf,

    /// Logical load path used by the heuristic fallback
    pub load_path: LoadPath,

    /// Path component marking installed third-party packages
    pub external_marker: String,

    /// Subdirectory of the external area that still counts as project code
    pub user_contrib_marker: String,

    /// Extension of source files, without the dot
    pub source_extension: String,

    /// Remember failed lookups until the next export alias is registered
    pub cache_misses: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            load_path: LoadPath::default(),
            external_marker: ".opam".to_string(),
            user_contrib_marker: "user-contrib".to_string(),
            source_extension: "v".to_string(),
            cache_misses: true,
        }
    }
}

impl ResolverConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_mapping(mut self, physical: impl Into<PathBuf>, logical: impl Into<String>) -> Self {
        self.load_path.push(LoadPathEntry::new(physical, logical));
        self
    }

    /// Load configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate().map_err(ResolveError::Config)?;
        Ok(config)
    }

    /// Build configuration from a `_CoqProject`-style file.
    ///
    /// The project root is the directory holding the file.
    pub fn from_project_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let project_root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            project_root,
            load_path: LoadPath::parse(&text)?,
            ..Default::default()
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.source_extension.is_empty() || self.source_extension.starts_with('.') {
            return Err(format!(
                "source_extension must be a bare extension, got {:?}",
                self.source_extension
            ));
        }

        if self.external_marker.is_empty() {
            return Err("external_marker must not be empty".to_string());
        }

        Ok(())
    }

    /// Whether a resolved path lies in the external package area
    pub fn is_external(&self, path: &Path) -> bool {
        let has = |marker: &str| {
            !marker.is_empty()
                && path
                    .components()
                    .any(|c| c.as_os_str().to_string_lossy() == marker)
        };
        has(&self.external_marker) && !has(&self.user_contrib_marker)
    }
}
