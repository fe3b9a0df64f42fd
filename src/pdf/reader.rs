//! PDF document handle for chapter splitting
//!
//! Parsing and outline resolution go through lopdf; page copying goes
//! through qpdf. Both views are built once, up front, from the same bytes.

use crate::error::{Error, Result};
use crate::pdf::outline::{
    destination_from_object, extract_outline, lookup_named_destination, Destination,
    OutlineLeaf, OutlineNode, PageRef,
};
use crate::pdf::qpdf::QpdfWrapper;
use crate::pdf::SourceDocument;
use lopdf::ObjectId;

/// Parsed PDF with its outline tree
pub struct PdfDocument {
    inner: lopdf::Document,
    page_ids: Vec<ObjectId>,
    outline: Vec<OutlineNode>,
    writer: QpdfWrapper,
}

impl PdfDocument {
    /// Open a PDF from bytes
    pub fn open_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(Error::InvalidPdf {
                reason: "Not a valid PDF file".to_string(),
            });
        }

        let inner = lopdf::Document::load_mem(data).map_err(|e| Error::InvalidPdf {
            reason: e.to_string(),
        })?;

        // qpdf reports password protection, lopdf does not
        let writer = QpdfWrapper::open(data)?;

        let page_ids: Vec<ObjectId> = inner.get_pages().into_values().collect();
        check_page_counts(page_ids.len(), writer.page_count())?;
        let outline = extract_outline(&inner);

        tracing::debug!(
            pages = page_ids.len(),
            top_level_entries = outline.len(),
            "opened PDF"
        );

        Ok(Self {
            inner,
            page_ids,
            outline,
            writer,
        })
    }

    fn resolve_page_ref(&self, page: PageRef) -> Result<u32> {
        match page {
            PageRef::Object(id) => self
                .page_ids
                .iter()
                .position(|page_id| *page_id == id)
                .map(|index| index as u32)
                .ok_or_else(|| Error::NotAPage {
                    object: format!("{} {} R", id.0, id.1),
                }),
            PageRef::Index(index) if index < self.page_count() => Ok(index),
            PageRef::Index(index) => Err(Error::PageOutOfBounds {
                page: index + 1,
                total: self.page_count(),
            }),
        }
    }

    fn resolve_named(&self, name: &str) -> Result<u32> {
        let target = lookup_named_destination(&self.inner, name)
            .and_then(|value| destination_from_object(&self.inner, value));

        match target {
            Some(Destination::Explicit(page)) => self.resolve_page_ref(page),
            _ => Err(Error::NamedDestinationNotFound {
                name: name.to_string(),
            }),
        }
    }
}

/// Outline pages are indexed through lopdf but copied through qpdf, so both
/// must see the same page list.
fn check_page_counts(parsed: usize, writable: u32) -> Result<()> {
    if parsed == writable as usize {
        return Ok(());
    }
    tracing::warn!(parsed, writable, "page trees disagree");
    Err(Error::InvalidPdf {
        reason: format!(
            "Page tree is inconsistent: parsed {} pages but {} can be copied",
            parsed, writable
        ),
    })
}

impl SourceDocument for PdfDocument {
    fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    fn outline(&self) -> &[OutlineNode] {
        &self.outline
    }

    fn destination_page(&self, leaf: &OutlineLeaf) -> Result<Option<u32>> {
        match &leaf.destination {
            None => Ok(None),
            Some(Destination::Explicit(page)) => self.resolve_page_ref(*page).map(Some),
            Some(Destination::Named(name)) => self.resolve_named(name).map(Some),
        }
    }

    fn write_pages(&self, indices: &[u32]) -> Result<Vec<u8>> {
        self.writer.extract_pages(indices)
    }
}
