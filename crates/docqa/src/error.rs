//! Error types for the document assistant

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for docqa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Document assistant errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// No candidate encoding could decode a text file
    #[error("Could not decode '{0}' with any supported encoding")]
    Encoding(String),

    /// Folder given for scanning does not exist
    #[error("Folder path does not exist: {}", .0.display())]
    FolderNotFound(PathBuf),

    /// Processing request selected no files
    #[error("No supported documents to process")]
    NoDocuments,

    /// None of the selected files yielded text
    #[error("No extractable text found in {total} file(s)")]
    NoExtractableText { total: usize },

    /// Question asked before any document was processed
    #[error("Please process documents first before asking questions")]
    NoIndex,

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector store error
    #[error("Vector store error: {0}")]
    VectorDb(String),

    /// Ollama/LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// A backend call exceeded its time budget
    #[error("{operation} timed out after {}s", .elapsed.as_secs())]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector db error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Requests rejected before reaching any backend.
    ///
    /// These are shown to the user as warnings rather than failures.
    pub fn is_user_warning(&self) -> bool {
        matches!(
            self,
            Error::NoIndex | Error::NoDocuments | Error::FolderNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_requests_are_warnings() {
        assert!(Error::NoIndex.is_user_warning());
        assert!(Error::NoDocuments.is_user_warning());
        assert!(Error::FolderNotFound(PathBuf::from("/nope")).is_user_warning());
        assert!(!Error::NoExtractableText { total: 2 }.is_user_warning());
        assert!(!Error::llm("boom").is_user_warning());
    }

    #[test]
    fn test_timeout_message() {
        let err = Error::Timeout {
            operation: "Answer generation",
            elapsed: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Answer generation timed out after 30s");
    }
}
