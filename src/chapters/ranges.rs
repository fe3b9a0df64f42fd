//! Top-level outline entries to chapter page ranges

use super::diagnostics::Diagnostics;
use super::slug::chapter_slug;
use super::CHAPTER_EXTENSION;
use crate::pdf::{OutlineLeaf, OutlineNode, SourceDocument};
use serde::Serialize;

/// Contiguous page span assigned to one top-level outline entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterRange {
    pub slug: String,
    /// First page, 0-indexed inclusive
    pub start: u32,
    /// 0-indexed exclusive
    pub end: u32,
}

impl ChapterRange {
    pub fn new(slug: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            slug: slug.into(),
            start,
            end,
        }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn filename(&self) -> String {
        format!("{}{}", self.slug, CHAPTER_EXTENSION)
    }
}

/// Resolve a leaf's page, recording a warning when it has none.
///
/// `kind` names the entry in the warning, e.g. "outline item".
pub(crate) fn resolve_page<D: SourceDocument + ?Sized>(
    doc: &D,
    leaf: &OutlineLeaf,
    kind: &str,
    diagnostics: &mut Diagnostics,
) -> Option<u32> {
    match doc.destination_page(leaf) {
        Ok(Some(page)) => Some(page),
        Ok(None) => {
            diagnostics.warn(format!(
                "Could not get page number for {}: {}",
                kind, leaf.title
            ));
            None
        }
        Err(e) => {
            diagnostics.warn(format!("Error processing {} {}: {}", kind, leaf.title, e));
            None
        }
    }
}

/// Build chapter ranges from the top-level outline leaves.
///
/// Unresolvable leaves are dropped before numbering, so slugs count only the
/// entries that made it. Each range ends where the next resolved entry
/// starts, and the last one ends at the page count. Ranges that would be
/// empty are skipped; a later entry pointing before an earlier one is also
/// reported.
pub fn outline_to_ranges<D: SourceDocument + ?Sized>(
    doc: &D,
    diagnostics: &mut Diagnostics,
) -> Vec<ChapterRange> {
    let resolved: Vec<(&OutlineLeaf, u32)> = doc
        .outline()
        .iter()
        .filter_map(OutlineNode::as_leaf)
        .filter_map(|leaf| {
            resolve_page(doc, leaf, "outline item", diagnostics).map(|page| (leaf, page))
        })
        .collect();

    let page_count = doc.page_count();
    let mut ranges = Vec::with_capacity(resolved.len());

    for (i, (leaf, start)) in resolved.iter().enumerate() {
        let end = resolved
            .get(i + 1)
            .map(|(_, next)| *next)
            .unwrap_or(page_count);
        let slug = chapter_slug(i, &leaf.title);

        if *start < end {
            ranges.push(ChapterRange::new(slug, *start, end));
        } else if *start > end {
            diagnostics.warn(format!(
                "Outline item {} starts at page {} after the next chapter at page {}; skipping range {}",
                leaf.title,
                start + 1,
                end + 1,
                slug
            ));
        }
    }

    tracing::debug!(ranges = ranges.len(), "built chapter ranges");
    ranges
}
