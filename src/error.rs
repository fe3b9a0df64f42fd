//! Error types for the PDF chapter splitter

use thiserror::Error;

/// Result type alias for the PDF chapter splitter
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the PDF chapter splitter
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is password protected
    #[error("PDF is password protected")]
    PasswordRequired,

    /// Page out of bounds
    #[error("Page {page} out of bounds (total: {total})")]
    PageOutOfBounds { page: u32, total: u32 },

    /// Destination points at an object that is not a page of this document
    #[error("Destination object {object} is not a page")]
    NotAPage { object: String },

    /// Named destination missing from /Dests and the /Names tree
    #[error("Named destination not found: {name}")]
    NamedDestinationNotFound { name: String },

    /// Outline nesting exceeds the supported depth
    #[error("Outline nesting exceeds {depth} levels")]
    OutlineTooDeep { depth: usize },

    /// Cache key not found
    #[error("Cache key not found: {key}")]
    CacheKeyNotFound { key: String },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// qpdf error
    #[error("qpdf error: {reason}")]
    QpdfError { reason: String },

    /// Background task failed to complete
    #[error("Task join error: {reason}")]
    TaskJoin { reason: String },
}

impl Error {
    /// Return a sanitized error message safe to send to clients.
    /// Internal details (object ids, library errors) are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::InvalidPdf { .. } => "Invalid PDF file".to_string(),
            Error::PasswordRequired => "PDF is password protected".to_string(),
            Error::PageOutOfBounds { page, total } => {
                format!("Page {} out of bounds (total: {})", page, total)
            }
            Error::NotAPage { .. } => "Outline destination is not a page".to_string(),
            Error::NamedDestinationNotFound { name } => {
                format!("Named destination not found: {}", name)
            }
            Error::OutlineTooDeep { depth } => format!("Outline nesting exceeds {} levels", depth),
            Error::CacheKeyNotFound { .. } => "Cache key not found".to_string(),
            Error::Base64Decode(_) => "Invalid base64 data".to_string(),
            Error::Serialization(_) => "Serialization error".to_string(),
            Error::QpdfError { .. } => "PDF processing error".to_string(),
            Error::TaskJoin { .. } => "Internal processing error".to_string(),
        }
    }
}
