//! Error types for GraphForge operations

use thiserror::Error;

/// Result type alias for GraphForge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for GraphForge
#[derive(Error, Debug)]
pub enum Error {
    /// Storage access was denied or revoked; the user must re-authorize
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// An expected file or folder is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// A source or cache file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// A source file is not a supported ontology format or is not UTF-8
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// Quads could not be turned into N-Quads text
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Triple store error
    #[error("Store error: {0}")]
    Store(String),

    /// Query parsing or evaluation error
    #[error("Query error: {0}")]
    Query(String),

    /// The query produced something other than variable bindings
    #[error("Unsupported result type: {0}")]
    UnsupportedResult(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors that only disqualify one source file during triplification.
    pub fn is_per_file(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::InvalidSource(_))
    }
}

impl From<oxigraph::store::StorageError> for Error {
    fn from(err: oxigraph::store::StorageError) -> Self {
        Error::Store(err.to_string())
    }
}

impl From<oxigraph::sparql::QueryEvaluationError> for Error {
    fn from(err: oxigraph::sparql::QueryEvaluationError) -> Self {
        Error::Query(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}
