//! In-memory PDF fixtures for the test suite.
//!
//! Builds small documents with `lopdf` so tests never depend on binary
//! fixture files. Every page draws the marker text `(Page N)` (1-indexed),
//! which `page_markers` reads back to check which pages a chapter holds.
//!
//! ```ignore
//! let pdf = build_pdf(10, &[
//!     bookmark("Intro", Target::Page(0)),
//!     bookmark("Body", Target::Page(3)).with_children(vec![
//!         bookmark("Section", Target::Page(4)),
//!     ]),
//! ]);
//! ```
#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Where a fixture bookmark jumps to.
#[derive(Debug, Clone)]
pub enum Target {
    /// Explicit `/Dest [page /Fit]` (0-indexed). Indices past the last page
    /// are written as a raw integer page number.
    Page(u32),
    /// `/A << /S /GoTo /D [page /XYZ 0 792 0] >>`
    GoTo(u32),
    /// `/Dest (name)` registered in the catalog `/Names /Dests` tree
    Named(&'static str, u32),
    /// `/Dest /name` registered in the legacy catalog `/Dests` dictionary
    CatalogDest(&'static str, u32),
    /// `/Dest (name)` that nothing registers
    UnknownName(&'static str),
    /// `/Dest` pointing at the `/Pages` node instead of a page
    NotAPage,
    /// No destination at all
    None,
}

/// Fixture outline entry.
#[derive(Debug, Clone)]
pub struct FixtureBookmark {
    pub title: Option<String>,
    pub indirect_title: bool,
    pub target: Target,
    pub children: Vec<FixtureBookmark>,
}

impl FixtureBookmark {
    pub fn with_children(mut self, children: Vec<FixtureBookmark>) -> Self {
        self.children = children;
        self
    }

    /// Store `/Title` behind an indirect reference.
    pub fn indirect(mut self) -> Self {
        self.indirect_title = true;
        self
    }
}

pub fn bookmark(title: &str, target: Target) -> FixtureBookmark {
    FixtureBookmark {
        title: Some(title.to_string()),
        indirect_title: false,
        target,
        children: Vec::new(),
    }
}

/// Bookmark without a `/Title` entry.
pub fn untitled(target: Target) -> FixtureBookmark {
    FixtureBookmark {
        title: None,
        indirect_title: false,
        target,
        children: Vec::new(),
    }
}

/// Build and serialize a document with `page_count` pages and the given outline.
pub fn build_pdf(page_count: u32, bookmarks: &[FixtureBookmark]) -> Vec<u8> {
    let mut doc = build_document(page_count, bookmarks);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("Failed to serialize fixture PDF");
    buffer
}

pub fn build_document(page_count: u32, bookmarks: &[FixtureBookmark]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_ids = Vec::with_capacity(page_count as usize);
    for index in 0..page_count {
        let content = format!("BT /F1 24 Tf 72 720 Td (Page {}) Tj ET", index + 1);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => page_count as i64,
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };

    if !bookmarks.is_empty() {
        let outlines_id = doc.new_object_id();
        let mut builder = OutlineBuilder {
            doc: &mut doc,
            pages_id,
            page_ids: &page_ids,
            names: Vec::new(),
            dests: Dictionary::new(),
        };
        let (first, last, count) = builder.add_level(outlines_id, bookmarks);
        let mut names = std::mem::take(&mut builder.names);
        let dests = std::mem::take(&mut builder.dests);

        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => first,
                "Last" => last,
                "Count" => count,
            }),
        );
        catalog.set("Outlines", outlines_id);

        if !names.is_empty() {
            names.sort_by(|a, b| a.0.cmp(&b.0));
            let pairs: Vec<Object> = names
                .into_iter()
                .flat_map(|(name, dest)| [Object::string_literal(name), dest])
                .collect();
            catalog.set("Names", dictionary! { "Dests" => dictionary! { "Names" => pairs } });
        }
        if !dests.is_empty() {
            catalog.set("Dests", dests);
        }
    }

    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);
    doc
}

struct OutlineBuilder<'a> {
    doc: &'a mut Document,
    pages_id: ObjectId,
    page_ids: &'a [ObjectId],
    names: Vec<(String, Object)>,
    dests: Dictionary,
}

impl OutlineBuilder<'_> {
    /// Returns (first, last, visible descendant count) for one sibling level.
    fn add_level(&mut self, parent: ObjectId, items: &[FixtureBookmark]) -> (ObjectId, ObjectId, i64) {
        let ids: Vec<ObjectId> = items.iter().map(|_| self.doc.new_object_id()).collect();
        let mut count = 0;

        for (i, item) in items.iter().enumerate() {
            let mut dict = dictionary! { "Parent" => parent };

            if let Some(title) = &item.title {
                let title = text_string(title);
                if item.indirect_title {
                    let title_id = self.doc.add_object(title);
                    dict.set("Title", title_id);
                } else {
                    dict.set("Title", title);
                }
            }
            if i > 0 {
                dict.set("Prev", ids[i - 1]);
            }
            if i + 1 < ids.len() {
                dict.set("Next", ids[i + 1]);
            }

            match &item.target {
                Target::Page(page) => dict.set("Dest", self.explicit_dest(*page)),
                Target::GoTo(page) => dict.set(
                    "A",
                    dictionary! {
                        "S" => "GoTo",
                        "D" => vec![self.page_ref(*page), "XYZ".into(), 0.into(), 792.into(), 0.into()],
                    },
                ),
                Target::Named(name, page) => {
                    let dest = self.explicit_dest(*page);
                    self.names.push((name.to_string(), dest));
                    dict.set("Dest", Object::string_literal(*name));
                }
                Target::CatalogDest(name, page) => {
                    let dest = self.explicit_dest(*page);
                    self.dests.set(name.as_bytes().to_vec(), dest);
                    dict.set("Dest", Object::Name(name.as_bytes().to_vec()));
                }
                Target::UnknownName(name) => dict.set("Dest", Object::string_literal(*name)),
                Target::NotAPage => dict.set(
                    "Dest",
                    vec![Object::Reference(self.pages_id), "Fit".into()],
                ),
                Target::None => {}
            }

            if !item.children.is_empty() {
                let (first, last, child_count) = self.add_level(ids[i], &item.children);
                dict.set("First", first);
                dict.set("Last", last);
                dict.set("Count", child_count);
                count += child_count;
            }
            count += 1;

            self.doc.objects.insert(ids[i], Object::Dictionary(dict));
        }

        (ids[0], ids[ids.len() - 1], count)
    }

    fn page_ref(&self, page: u32) -> Object {
        match self.page_ids.get(page as usize) {
            Some(id) => Object::Reference(*id),
            None => Object::Integer(page as i64),
        }
    }

    fn explicit_dest(&self, page: u32) -> Object {
        Object::Array(vec![self.page_ref(page), "Fit".into()])
    }
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Page count of serialized PDF bytes.
pub fn page_count(data: &[u8]) -> usize {
    Document::load_mem(data)
        .expect("Failed to parse PDF")
        .get_pages()
        .len()
}

/// The `Page N` markers drawn on each page, in page order.
pub fn page_markers(data: &[u8]) -> Vec<u32> {
    let doc = Document::load_mem(data).expect("Failed to parse PDF");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc
                .get_page_content(page_id)
                .expect("Failed to read page content");
            let text = String::from_utf8_lossy(&content);
            let start = text.find("(Page ").expect("Page marker missing") + "(Page ".len();
            let end = start + text[start..].find(')').expect("Unterminated page marker");
            text[start..end].parse().expect("Invalid page marker")
        })
        .collect()
}
