use crate::syntax::NodeId;
use thiserror::Error;

/// Classmap error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid syntax tree: {0}")]
    InvalidTree(String),

    #[error("{what} not found: {key}")]
    NotFound { what: &'static str, key: String },

    #[error("Node {0} is already registered in the diagram")]
    AlreadyRegistered(NodeId),
}

/// Result type alias for classmap operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create an invalid tree error
    pub fn invalid_tree(msg: impl Into<String>) -> Self {
        Error::InvalidTree(msg.into())
    }

    /// Create a lookup miss for a caller-driven query
    pub fn not_found(what: &'static str, key: impl ToString) -> Self {
        Error::NotFound {
            what,
            key: key.to_string(),
        }
    }

    /// Check if this is a lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
