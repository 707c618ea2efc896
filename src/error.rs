//! Error types for the scopesheet pipeline.

use std::io;
use thiserror::Error;

/// Result type alias for scopesheet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while turning a document into a workbook.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the input or writing the output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The content is not a Word document.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The container looks like a Word document but cannot be read.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// No task survived extraction and deduplication.
    #[error("No tasks found in document")]
    ExtractionEmpty,

    /// The workbook (or JSON) output could not be encoded.
    #[error("Serialization failure: {0}")]
    Serialization(String),

    /// A vocabulary or option file could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of an [`Error`], used by callers at the process or
/// transport boundary to pick a status without matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Read or write failure at the boundary.
    IoFailure,
    /// Content signature does not match a Word document.
    UnsupportedFormat,
    /// Container unreadable or corrupt.
    InvalidDocument,
    /// Zero task records.
    ExtractionEmpty,
    /// Output encoding failed.
    SerializationFailure,
    /// Bad configuration data.
    InvalidConfig,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::IoFailure,
            Error::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Error::InvalidDocument(_) => ErrorKind::InvalidDocument,
            Error::ExtractionEmpty => ErrorKind::ExtractionEmpty,
            Error::Serialization(_) => ErrorKind::SerializationFailure,
            Error::Config(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Process exit code for this error. Always non-zero.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::IoFailure => 1,
            ErrorKind::UnsupportedFormat => 2,
            ErrorKind::InvalidDocument => 3,
            ErrorKind::ExtractionEmpty => 4,
            ErrorKind::SerializationFailure => 5,
            ErrorKind::InvalidConfig => 6,
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(e) => Error::Io(io::Error::new(e.kind(), e.to_string())),
            _ => Error::InvalidDocument(format!("malformed XML: {}", err)),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::InvalidDocument(format!("malformed XML attribute: {}", err))
    }
}

impl From<quick_xml::escape::EscapeError> for Error {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Error::InvalidDocument(format!("malformed XML entity: {}", err))
    }
}
