//! Chapter slicing

use super::diagnostics::Diagnostics;
use super::ranges::ChapterRange;
use crate::pdf::SourceDocument;

/// One generated chapter PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterArtifact {
    /// `<slug>.pdf`
    pub filename: String,
    pub data: Vec<u8>,
    /// 0-indexed page of the source document the chapter starts at
    pub first_page: u32,
    pub page_count: u32,
}

/// Copy the pages of `range` into a new PDF.
///
/// Pages past the end of the document truncate the slice with a warning.
/// Returns `None` when no page could be copied or writing failed; the
/// reason is recorded in `diagnostics`.
pub fn create_slice<D: SourceDocument + ?Sized>(
    doc: &D,
    range: &ChapterRange,
    diagnostics: &mut Diagnostics,
) -> Option<ChapterArtifact> {
    let total = doc.page_count();
    let mut indices = Vec::with_capacity(range.len() as usize);

    for index in range.start..range.end {
        if index >= total {
            diagnostics.warn(format!(
                "Page index {} out of bounds (total pages: {}) for slice {}",
                index, total, range.slug
            ));
            break;
        }
        indices.push(index);
    }

    if indices.is_empty() {
        diagnostics.warn(format!("Slice '{}' resulted in an empty PDF.", range.slug));
        return None;
    }

    match doc.write_pages(&indices) {
        Ok(data) => {
            tracing::debug!(
                slug = %range.slug,
                pages = indices.len(),
                bytes = data.len(),
                "created slice"
            );
            Some(ChapterArtifact {
                filename: range.filename(),
                data,
                first_page: range.start,
                page_count: indices.len() as u32,
            })
        }
        Err(e) => {
            diagnostics.error(format!(
                "Error creating slice '{}' (pages {}-{}): {}",
                range.slug, range.start, range.end, e
            ));
            None
        }
    }
}
