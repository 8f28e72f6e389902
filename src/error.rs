//! Error types for the structure recovery library.
//!
//! This module defines all error types that can occur while segmenting,
//! ordering, classifying and splitting document content.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during structure recovery.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Page, zone or chunk geometry that violates the model invariants
    /// (negative or non-finite extents, chunks on a page without bounds).
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Classifier model missing, unloadable or not trained.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Two feature vectors, or a vector and a model, disagree on their features.
    #[error("Invalid feature set: expected {expected:?}, found {found:?}")]
    InvalidFeatureSet {
        /// Feature names the consumer expected
        expected: Vec<String>,
        /// Feature names actually supplied
        found: Vec<String>,
    },

    /// The model answered, but the answer cannot be applied to the document.
    #[error("Classification error: {0}")]
    Classification(String),

    /// A batch input did not finish before its deadline.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build an [`Error::InvalidFeatureSet`] from two name lists.
    pub fn feature_mismatch<A, B>(expected: A, found: B) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Error::InvalidFeatureSet {
            expected: expected.into_iter().map(Into::into).collect(),
            found: found.into_iter().map(Into::into).collect(),
        }
    }
}
