use thiserror::Error;

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors raised while configuring or driving the resolver.
///
/// An unresolvable name is not an error: resolution returns `None` for it.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The external name-location session failed
    #[error("Lookup session error: {0}")]
    Session(String),

    /// Malformed load-path declaration in a project file
    #[error("Invalid project file: {0}")]
    InvalidProjectFile(String),

    /// Invalid resolver configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ResolveError {
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    pub fn invalid_project_file(msg: impl Into<String>) -> Self {
        Self::InvalidProjectFile(msg.into())
    }
}
