//! In-memory `SourceDocument` for pipeline tests

use crate::error::{Error, Result};
use crate::pdf::{Destination, OutlineLeaf, OutlineNode, PageRef, SourceDocument};

/// How `write_pages` behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Return the page indices as comma separated text
    Echo,
    Fail,
    Panic,
}

pub struct MemoryDocument {
    pub pages: u32,
    pub outline: Vec<OutlineNode>,
    pub write_mode: WriteMode,
    /// Reported page count differs from `pages` when set
    pub reported_pages: Option<u32>,
}

impl MemoryDocument {
    pub fn new(pages: u32, outline: Vec<OutlineNode>) -> Self {
        Self {
            pages,
            outline,
            write_mode: WriteMode::Echo,
            reported_pages: None,
        }
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }
}

/// Leaf jumping to a 0-based page index
pub fn leaf(title: &str, page: u32) -> OutlineNode {
    OutlineNode::Leaf(OutlineLeaf::new(
        title,
        Some(Destination::Explicit(PageRef::Index(page))),
    ))
}

/// Leaf with no destination
pub fn dangling(title: &str) -> OutlineNode {
    OutlineNode::Leaf(OutlineLeaf::new(title, None))
}

/// Leaf pointing at a named destination that never resolves
pub fn named(title: &str, name: &str) -> OutlineNode {
    OutlineNode::Leaf(OutlineLeaf::new(
        title,
        Some(Destination::Named(name.to_string())),
    ))
}

pub fn group(children: Vec<OutlineNode>) -> OutlineNode {
    OutlineNode::Group(children)
}

/// Decode the bytes produced by `WriteMode::Echo`
pub fn echoed_pages(data: &[u8]) -> Vec<u32> {
    String::from_utf8_lossy(data)
        .split(',')
        .map(|page| page.parse().unwrap())
        .collect()
}

impl SourceDocument for MemoryDocument {
    fn page_count(&self) -> u32 {
        self.reported_pages.unwrap_or(self.pages)
    }

    fn outline(&self) -> &[OutlineNode] {
        &self.outline
    }

    fn destination_page(&self, leaf: &OutlineLeaf) -> Result<Option<u32>> {
        match &leaf.destination {
            None => Ok(None),
            Some(Destination::Explicit(PageRef::Index(page))) if *page < self.pages => {
                Ok(Some(*page))
            }
            Some(Destination::Explicit(PageRef::Index(page))) => Err(Error::PageOutOfBounds {
                page: page + 1,
                total: self.pages,
            }),
            Some(Destination::Explicit(PageRef::Object(id))) => Err(Error::NotAPage {
                object: format!("{} {} R", id.0, id.1),
            }),
            Some(Destination::Named(name)) => Err(Error::NamedDestinationNotFound {
                name: name.clone(),
            }),
        }
    }

    fn write_pages(&self, indices: &[u32]) -> Result<Vec<u8>> {
        match self.write_mode {
            WriteMode::Echo => Ok(indices
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",")
                .into_bytes()),
            WriteMode::Fail => Err(Error::QpdfError {
                reason: "simulated write failure".to_string(),
            }),
            WriteMode::Panic => panic!("simulated writer panic"),
        }
    }
}
