//! Error types for the billscan-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the billscan library.
#[derive(Error, Debug)]
pub enum BillscanError {
    /// Text acquisition (OCR) error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed or serialized.
    #[error("configuration error: {0}")]
    Config(String),
}

impl BillscanError {
    /// Whether the error came from text acquisition.
    ///
    /// Acquisition failures are recoverable from the caller's point of view:
    /// the image could not be read, so the user should retake the photo.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(self, BillscanError::Ocr(_))
    }
}

/// Errors related to text acquisition.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed inside the engine.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The payload could not be decoded as a supported image.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The engine ran but produced no text.
    #[error("no text detected in image")]
    EmptyText,
}

/// Errors related to bill record persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read or write the backing file.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not hold valid records.
    #[error("corrupt bill store {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Records could not be serialized.
    #[error("failed to serialize records: {0}")]
    Serialize(String),
}

/// Result type for the billscan library.
pub type Result<T> = std::result::Result<T, BillscanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_failure_classification() {
        let err: BillscanError = OcrError::EmptyText.into();
        assert!(err.is_acquisition_failure());

        let err = BillscanError::Config("bad".to_string());
        assert!(!err.is_acquisition_failure());
    }

    #[test]
    fn test_error_messages() {
        let err: BillscanError = OcrError::InvalidImage("not a png".to_string()).into();
        assert_eq!(err.to_string(), "OCR error: invalid image: not a png");
    }
}
