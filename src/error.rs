//! Error types for the pain_recon library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting and reconciling payment batches.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error writing CSV output.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The file is not well-formed XML.
    #[error("malformed document '{file}': {message}")]
    MalformedDocument { file: String, message: String },

    /// A transaction lacks a required sub-element.
    #[error("transaction #{transaction} is missing required field {field}")]
    MissingField {
        field: &'static str,
        transaction: usize,
    },

    /// An instructed amount is not a non-negative decimal.
    #[error("transaction #{transaction} has an invalid amount '{value}'")]
    InvalidAmount { value: String, transaction: usize },

    /// An exact decimal sum or difference does not fit in a `Decimal`.
    #[error("amount overflow while computing the {0}")]
    AmountOverflow(String),

    /// The input directory does not exist or is not a directory.
    #[error("directory '{}' does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The input directory holds no file matching the filter.
    #[error("no matching files found in '{}'", .0.display())]
    NoMatchingFiles(PathBuf),

    /// Configuration rejected before the run.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether this error concerns the input directory as a whole rather than
    /// a single file or output destination.
    pub fn is_directory_condition(&self) -> bool {
        matches!(self, Error::DirectoryNotFound(_) | Error::NoMatchingFiles(_))
    }

    /// Attach a file name to an error raised while reading one document.
    pub(crate) fn in_file(self, file: &str) -> Self {
        match self {
            Error::MalformedDocument { message, .. } => Error::MalformedDocument {
                file: file.to_string(),
                message,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_condition() {
        assert!(Error::DirectoryNotFound(PathBuf::from("/nope")).is_directory_condition());
        assert!(Error::NoMatchingFiles(PathBuf::from("/tmp")).is_directory_condition());
        assert!(!Error::InvalidConfig("x".into()).is_directory_condition());
    }

    #[test]
    fn test_in_file_renames_malformed_document() {
        let err = Error::MalformedDocument {
            file: String::new(),
            message: "bad".into(),
        }
        .in_file("batch.xml");
        assert_eq!(err.to_string(), "malformed document 'batch.xml': bad");

        let err = Error::MissingField {
            field: "InstdAmt",
            transaction: 2,
        }
        .in_file("batch.xml");
        assert_eq!(
            err.to_string(),
            "transaction #2 is missing required field InstdAmt"
        );
    }
}
