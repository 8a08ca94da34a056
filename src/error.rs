//! Error types for pdfscrape.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfscrape operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by parsing, extraction and batch processing.
///
/// Values that fail validation and malformed tables are not errors: they are
/// dropped from the output and logged at debug level.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading source files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The requested source file does not exist.
    #[error("Resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The decoded page dump could not be read.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A configured pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Extractor configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error during rendering.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::ResourceNotFound(PathBuf::from("missing.json"));
        assert_eq!(err.to_string(), "Resource not found: missing.json");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Decode(_)));
    }
}
