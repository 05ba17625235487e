use thiserror::Error;

/// Error types for msgcluster-rs
#[derive(Error, Debug)]
pub enum ClusterError {
    /// The number of clusters k is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// Not enough samples (messages or rows) for the requested operation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Model or vectorizer has not been fitted yet
    #[error("Model has not been fitted. Call fit() first.")]
    NotFitted,

    /// Dimension mismatch between data and model
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No document produced a single token
    #[error("Empty vocabulary: no message contains a token matching the token pattern")]
    EmptyVocabulary,

    /// The configured token pattern is not a valid regular expression
    #[error("Invalid token pattern: {0}")]
    InvalidTokenPattern(#[from] regex::Error),
}
