use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Cycle detected: topological order emitted {emitted} of {total} nodes")]
    Cycle { emitted: usize, total: usize },

    #[error("DOT parse error: {0}")]
    DotParse(String),
}
