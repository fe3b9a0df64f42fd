//! qpdf FFI wrapper for chapter slicing
//!
//! Copies page objects from the source document into a fresh document and
//! serializes it to memory using the qpdf crate (vendored FFI).

use crate::error::{Error, Result};
use qpdf::QPdf;

/// Source document opened with qpdf, ready to have pages copied out of it
pub struct QpdfWrapper {
    source: QPdf,
    num_pages: u32,
}

/// Map qpdf crate errors to our error types
fn map_qpdf_error(e: qpdf::QPdfError) -> Error {
    match e.error_code() {
        qpdf::QPdfErrorCode::InvalidPassword => Error::PasswordRequired,
        _ => Error::QpdfError {
            reason: e.to_string(),
        },
    }
}

impl QpdfWrapper {
    /// Open raw PDF bytes for page copying
    pub fn open(input_data: &[u8]) -> Result<Self> {
        let source = QPdf::read_from_memory(input_data).map_err(map_qpdf_error)?;
        let num_pages = source.get_num_pages().map_err(map_qpdf_error)?;
        Ok(Self { source, num_pages })
    }

    /// Number of pages in the source document
    pub fn page_count(&self) -> u32 {
        self.num_pages
    }

    /// Copy the given pages (0-indexed, in order) into a new PDF
    ///
    /// # Arguments
    /// * `indices` - Page indices to copy; duplicates are copied again
    ///
    /// # Returns
    /// The new PDF as bytes
    pub fn extract_pages(&self, indices: &[u32]) -> Result<Vec<u8>> {
        if indices.is_empty() {
            return Err(Error::QpdfError {
                reason: "No pages selected".to_string(),
            });
        }

        let dest = QPdf::empty();

        for &idx in indices {
            let page = self
                .source
                .get_page(idx)
                .ok_or_else(|| Error::PageOutOfBounds {
                    page: idx + 1,
                    total: self.num_pages,
                })?;
            let copied = dest.copy_from_foreign(&page);
            dest.add_page(&copied, false).map_err(map_qpdf_error)?;
        }

        let mut writer = dest.writer();
        writer.preserve_encryption(false);
        writer.write_to_memory().map_err(map_qpdf_error)
    }
}
