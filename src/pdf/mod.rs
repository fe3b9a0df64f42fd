//! PDF processing layer
//!
//! Outline ingestion and destination resolution use lopdf; page slicing uses qpdf.

pub mod outline;
mod qpdf;
mod reader;

pub use outline::{Destination, OutlineLeaf, OutlineNode, PageRef};
pub use qpdf::QpdfWrapper;
pub use reader::PdfDocument;

use crate::error::Result;

/// A readable, sliceable document with an outline.
///
/// The chapter pipeline only talks to documents through this trait, so the
/// range and TOC logic can run against in-memory fakes in tests.
pub trait SourceDocument {
    /// Total number of pages
    fn page_count(&self) -> u32;

    /// Top-level outline sequence: a leaf that has children is immediately
    /// followed by a `Group` holding them.
    fn outline(&self) -> &[OutlineNode];

    /// 0-based page index an outline leaf jumps to.
    ///
    /// `Ok(None)` means the leaf has no destination. Errors mean the
    /// destination exists but could not be resolved.
    fn destination_page(&self, leaf: &OutlineLeaf) -> Result<Option<u32>>;

    /// Serialize a new PDF holding copies of the given pages, in order.
    fn write_pages(&self, indices: &[u32]) -> Result<Vec<u8>>;
}
