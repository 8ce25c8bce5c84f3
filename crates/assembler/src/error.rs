use thiserror::Error;

/// Result type for context assembly
pub type Result<T> = std::result::Result<T, AssembleError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("Unknown symbol {name} in {file}")]
    UnknownSymbol { file: String, name: String },

    #[error("Invalid options: {0}")]
    Options(String),
}
