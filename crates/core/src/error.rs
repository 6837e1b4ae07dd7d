//! Error types for slide question answering.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed underlying cause carried by parse errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while answering a question against a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// The deck could not be obtained (bad link, unreadable upload).
    #[error("Failed to acquire document: {0}")]
    Acquisition(String),

    /// The deck could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The deck parsed but no slide carried any text.
    #[error("No content found in slides")]
    EmptyContent,

    /// The scorer was called without candidates.
    #[error("No candidate embeddings to score")]
    EmptyCandidateSet,

    /// The embedding model could not be loaded.
    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    /// Inference failed on an otherwise loaded model.
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Query and candidate vectors have different lengths.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The question was empty or whitespace only.
    #[error("Please enter a question")]
    EmptyQuestion,

    /// The document contained zero bytes.
    #[error("Please provide a slide deck")]
    EmptyDocument,
}

impl Error {
    /// Whether this is an input validation failure rather than a processing error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::EmptyQuestion | Error::EmptyDocument)
    }
}

/// Reasons a slide-deck container could not be read.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The bytes are not a container format we can read.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// ZIP archive error.
    #[error("ZIP error in '{part}': {source}")]
    Zip {
        part: String,
        #[source]
        source: BoxError,
    },

    /// XML parsing error inside a package part.
    #[error("XML parsing error in '{part}': {source}")]
    Xml {
        part: String,
        #[source]
        source: BoxError,
    },

    /// A required package part is absent.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// A relationship id points nowhere.
    #[error("Broken relationship: {0}")]
    BrokenRelationship(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_validation_kinds() {
        assert!(Error::EmptyQuestion.is_validation());
        assert!(Error::EmptyDocument.is_validation());
        assert!(!Error::EmptyContent.is_validation());
        assert!(!Error::EmptyCandidateSet.is_validation());
    }

    #[test]
    fn test_parse_error_keeps_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad header");
        let err = ParseError::Zip {
            part: "archive".to_string(),
            source: Box::new(cause),
        };
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "ZIP error in 'archive': bad header");

        let err: Error = err.into();
        assert!(matches!(err, Error::Parse(ParseError::Zip { .. })));
    }
}
