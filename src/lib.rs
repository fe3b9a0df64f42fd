//! PDF Chapter Splitter Library
//!
//! Splits a PDF into one PDF per top-level bookmark and renders its table of
//! contents. The core lives in [`chapters`]; [`server`] exposes it as MCP tools:
//! - `split_by_outline`: Split a PDF into chapter PDFs
//! - `extract_toc`: Preview the table of contents and chapter plan

pub mod chapters;
pub mod error;
pub mod pdf;
pub mod server;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use chapters::{split_document, split_source, ChapterArtifact, ProcessingResult, Status};
pub use error::{Error, Result};
pub use pdf::{PdfDocument, SourceDocument};
pub use server::{run_server, run_server_with_config, PdfServer, PdfSource, ServerConfig};
