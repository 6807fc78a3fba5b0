//! Error types for the docexpand library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`DocExpandError`] enum. Backend failures (tokenizers, model forward
//! passes, hub downloads) are mapped into the `Tokenization` and `Model`
//! variants at the boundary where they occur.
//!
//! # Examples
//!
//! ```
//! use docexpand::error::{DocExpandError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(DocExpandError::invalid_argument("k must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for docexpand operations.
#[derive(Error, Debug)]
pub enum DocExpandError {
    /// I/O errors (config files, input documents, model files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Tokenizer errors (encoding, decoding, vocabulary access)
    #[error("Tokenization error: {0}")]
    Tokenization(String),

    /// Model errors (loading weights, forward pass, tensor conversion)
    #[error("Model error: {0}")]
    Model(String),

    /// Errors raised while selecting expansion terms
    #[error("Expansion error: {0}")]
    Expansion(String),

    /// Invalid argument passed by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown expansion-type or device identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Two sequences that must be paired element-wise have different lengths
    #[error("Length mismatch: expected {expected} items, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested functionality has no implementation registered
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with DocExpandError.
pub type Result<T> = std::result::Result<T, DocExpandError>;

impl DocExpandError {
    /// Create a new tokenization error.
    pub fn tokenization<S: Into<String>>(msg: S) -> Self {
        DocExpandError::Tokenization(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        DocExpandError::Model(msg.into())
    }

    /// Create a new expansion error.
    pub fn expansion<S: Into<String>>(msg: S) -> Self {
        DocExpandError::Expansion(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        DocExpandError::InvalidArgument(msg.into())
    }

    /// Create a new invalid identifier error.
    pub fn invalid_identifier<S: Into<String>>(msg: S) -> Self {
        DocExpandError::InvalidIdentifier(msg.into())
    }

    /// Create a new length mismatch error.
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        DocExpandError::LengthMismatch { expected, actual }
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        DocExpandError::Config(msg.into())
    }

    /// Create a new not implemented error.
    pub fn not_implemented<S: Into<String>>(msg: S) -> Self {
        DocExpandError::NotImplemented(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        DocExpandError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = DocExpandError::model("forward pass failed");
        assert_eq!(error.to_string(), "Model error: forward pass failed");

        let error = DocExpandError::invalid_identifier("bm25");
        assert_eq!(error.to_string(), "Invalid identifier: bm25");

        let error = DocExpandError::length_mismatch(2, 3);
        assert_eq!(
            error.to_string(),
            "Length mismatch: expected 2 items, got 3"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = DocExpandError::from(io_error);

        match error {
            DocExpandError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
