use proofctx_graph::GraphError;
use thiserror::Error;

/// Result type for extraction
pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// An import statement the pipeline cannot interpret
    #[error("Malformed import in {file}: {statement:?}")]
    MalformedImport { file: String, statement: String },

    /// The file graph has no processing order
    #[error("File graph error: {0}")]
    Graph(#[from] GraphError),

    /// A statement or symbol graph source failed
    #[error("Source error for {file}: {message}")]
    Source { file: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ExtractError {
    pub fn malformed_import(file: impl Into<String>, statement: impl Into<String>) -> Self {
        Self::MalformedImport {
            file: file.into(),
            statement: statement.into(),
        }
    }

    pub fn source_failure(file: impl Into<String>, message: impl ToString) -> Self {
        Self::Source {
            file: file.into(),
            message: message.to_string(),
        }
    }
}
