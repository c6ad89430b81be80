//! Error types for canonry.

use thiserror::Error;

/// Result type alias using canonry's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for canonry operations.
///
/// Every fatal condition the pipeline can hit has a variant here. None of
/// them is retried automatically: embedding and matching are deterministic
/// given a fixed model and seed, so an identical retry cannot succeed.
#[derive(Error, Debug)]
pub enum Error {
    /// Required column missing or malformed in an input table
    #[error("Schema error: {0}")]
    Schema(String),

    /// Embedding model failed to load or is not served by the backend
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Zero rows where at least one is required (would divide by zero)
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Invalid input (dimension mismatch, zero top-k, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pipeline stage failed; carries the stage name and the cause
    #[error("pipeline stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap this error with the name of the pipeline stage it surfaced in.
    ///
    /// Already-wrapped errors are returned unchanged so the innermost stage
    /// name wins.
    pub fn at_stage(self, stage: &str) -> Self {
        match self {
            Error::Stage { .. } => self,
            other => Error::Stage {
                stage: stage.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The stage name attached to this error, if any.
    pub fn stage(&self) -> Option<&str> {
        match self {
            Error::Stage { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_schema() {
        let err = Error::Schema("reference table missing column 'region'".to_string());
        assert_eq!(
            err.to_string(),
            "Schema error: reference table missing column 'region'"
        );
    }

    #[test]
    fn test_error_display_model_unavailable() {
        let err = Error::ModelUnavailable("model 'labse' not served".to_string());
        assert_eq!(err.to_string(), "Model unavailable: model 'labse' not served");
    }

    #[test]
    fn test_error_display_empty_dataset() {
        let err = Error::EmptyDataset("no variants to score".to_string());
        assert_eq!(err.to_string(), "Empty dataset: no variants to score");
    }

    #[test]
    fn test_at_stage_wraps_once() {
        let err = Error::EmptyDataset("zero rows".to_string())
            .at_stage("deduplicated")
            .at_stage("embedded");
        assert_eq!(err.stage(), Some("deduplicated"));
        assert_eq!(
            err.to_string(),
            "pipeline stage 'deduplicated' failed: Empty dataset: zero rows"
        );
    }

    #[test]
    fn test_stage_source_chain() {
        use std::error::Error as StdError;
        let err = Error::Embedding("connection refused".to_string()).at_stage("embedded");
        let source = err.source().expect("stage error has a source");
        assert_eq!(source.to_string(), "Embedding error: connection refused");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("I/O error:"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_stage_on_plain_error_is_none() {
        assert_eq!(Error::Config("bad".to_string()).stage(), None);
    }
}
