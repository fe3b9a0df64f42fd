//! Outline (bookmark) tree ingestion
//!
//! Walks the catalog `/Outlines` tree with lopdf and normalizes it into
//! [`OutlineNode`] values. Titles are decoded once here; destinations are kept
//! unresolved so each consumer can decide how to report a bad entry.

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::HashSet;

/// Maximum outline nesting that is ingested or rendered
pub const MAX_OUTLINE_DEPTH: usize = 64;

/// Safety limit on siblings at one level
const MAX_SIBLINGS: usize = 10_000;

/// Name trees deeper than this are treated as malformed
const MAX_NAME_TREE_DEPTH: usize = 32;

/// Title used when an entry has no readable `/Title`
pub const UNKNOWN_TITLE: &str = "unknown";

/// One node of the outline tree, in document order.
///
/// An outline item with children is stored as a `Leaf` immediately followed by
/// a `Group` holding those children.
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineNode {
    Leaf(OutlineLeaf),
    Group(Vec<OutlineNode>),
}

impl OutlineNode {
    pub fn as_leaf(&self) -> Option<&OutlineLeaf> {
        match self {
            OutlineNode::Leaf(leaf) => Some(leaf),
            OutlineNode::Group(_) => None,
        }
    }
}

/// A titled outline entry
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineLeaf {
    pub title: String,
    pub destination: Option<Destination>,
}

impl OutlineLeaf {
    pub fn new(title: impl Into<String>, destination: Option<Destination>) -> Self {
        Self {
            title: title.into(),
            destination,
        }
    }
}

/// Unresolved jump target of an outline entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Explicit destination array
    Explicit(PageRef),
    /// Named destination, looked up in `/Dests` or the `/Names` tree
    Named(String),
}

/// First element of an explicit destination array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRef {
    /// Indirect reference to a page object
    Object(ObjectId),
    /// Raw 0-indexed page number
    Index(u32),
}

/// Extract the outline tree from the document catalog.
///
/// Missing or malformed `/Outlines` yields an empty tree.
pub fn extract_outline(doc: &Document) -> Vec<OutlineNode> {
    let Some(first) = outline_first(doc) else {
        return Vec::new();
    };

    let mut visited = HashSet::new();
    collect_level(doc, first, 0, &mut visited)
}

fn outline_first(doc: &Document) -> Option<ObjectId> {
    let outlines = catalog(doc)?.get(b"Outlines").ok()?;
    let outlines = deref(doc, outlines)?.as_dict().ok()?;
    match outlines.get(b"First") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    }
}

/// Collect one sibling chain starting at `first`, recursing into `/First` children.
fn collect_level(
    doc: &Document,
    first: ObjectId,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
) -> Vec<OutlineNode> {
    let mut nodes = Vec::new();
    if depth >= MAX_OUTLINE_DEPTH {
        tracing::warn!(depth, "outline nesting truncated");
        return nodes;
    }

    let mut current = Some(first);
    let mut siblings = 0;

    while let Some(item_id) = current {
        // Circular reference protection
        if !visited.insert(item_id) || siblings >= MAX_SIBLINGS {
            break;
        }
        siblings += 1;

        let Ok(item) = doc.get_dictionary(item_id) else {
            break;
        };

        nodes.push(OutlineNode::Leaf(OutlineLeaf {
            title: resolve_title(doc, item),
            destination: parse_destination(doc, item),
        }));

        if let Ok(Object::Reference(child_id)) = item.get(b"First") {
            let children = collect_level(doc, *child_id, depth + 1, visited);
            if !children.is_empty() {
                nodes.push(OutlineNode::Group(children));
            }
        }

        current = match item.get(b"Next") {
            Ok(Object::Reference(next_id)) => Some(*next_id),
            _ => None,
        };
    }

    nodes
}

/// Resolve an outline item's `/Title`, stored directly or behind a reference.
///
/// Never fails: anything unreadable becomes [`UNKNOWN_TITLE`].
pub fn resolve_title(doc: &Document, item: &Dictionary) -> String {
    item.get(b"Title")
        .ok()
        .and_then(|title| deref(doc, title))
        .and_then(text_value)
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

fn text_value(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Decode a PDF text string (UTF-16BE or UTF-8 with BOM, else PDFDocEncoding).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    // No BOM, so lopdf applies its PDFDocEncoding table
    let literal = Object::String(bytes.to_vec(), StringFormat::Literal);
    lopdf::decode_text_string(&literal)
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}

/// Read `/Dest`, falling back to a `/A` GoTo action.
fn parse_destination(doc: &Document, item: &Dictionary) -> Option<Destination> {
    if let Ok(dest) = item.get(b"Dest") {
        return destination_from_object(doc, dest);
    }

    let action = deref(doc, item.get(b"A").ok()?)?.as_dict().ok()?;
    match action.get(b"S") {
        Ok(Object::Name(kind)) if kind.as_slice() == b"GoTo" => {}
        _ => return None,
    }
    destination_from_object(doc, action.get(b"D").ok()?)
}

/// Interpret a destination value: an array, a name/string, or a `<< /D ... >>`
/// dictionary as found in name trees.
pub(crate) fn destination_from_object(doc: &Document, obj: &Object) -> Option<Destination> {
    match deref(doc, obj)? {
        Object::Dictionary(dict) => match deref(doc, dict.get(b"D").ok()?)? {
            Object::Array(items) => explicit_destination(items),
            _ => None,
        },
        Object::Array(items) => explicit_destination(items),
        Object::String(bytes, _) => Some(Destination::Named(decode_text_string(bytes))),
        Object::Name(name) => Some(Destination::Named(
            String::from_utf8_lossy(name).into_owned(),
        )),
        _ => None,
    }
}

fn explicit_destination(items: &[Object]) -> Option<Destination> {
    match items.first()? {
        Object::Reference(id) => Some(Destination::Explicit(PageRef::Object(*id))),
        Object::Integer(index) => u32::try_from(*index)
            .ok()
            .map(|index| Destination::Explicit(PageRef::Index(index))),
        _ => None,
    }
}

/// Look a named destination up in the catalog `/Dests` dictionary, then in
/// the `/Names` `/Dests` name tree.
pub(crate) fn lookup_named_destination<'a>(doc: &'a Document, name: &str) -> Option<&'a Object> {
    let catalog = catalog(doc)?;

    if let Some(dests) = catalog
        .get(b"Dests")
        .ok()
        .and_then(|d| deref(doc, d))
        .and_then(|d| d.as_dict().ok())
    {
        if let Ok(value) = dests.get(name.as_bytes()) {
            return Some(value);
        }
    }

    let names = deref(doc, catalog.get(b"Names").ok()?)?.as_dict().ok()?;
    let tree = deref(doc, names.get(b"Dests").ok()?)?.as_dict().ok()?;
    search_name_tree(doc, tree, name, 0)
}

fn search_name_tree<'a>(
    doc: &'a Document,
    node: &'a Dictionary,
    name: &str,
    depth: usize,
) -> Option<&'a Object> {
    if depth >= MAX_NAME_TREE_DEPTH {
        return None;
    }

    if let Some(Object::Array(pairs)) = node.get(b"Names").ok().and_then(|n| deref(doc, n)) {
        for pair in pairs.chunks_exact(2) {
            if let Some(key) = deref(doc, &pair[0]).and_then(text_value) {
                if key == name {
                    return Some(&pair[1]);
                }
            }
        }
    }

    if let Some(Object::Array(kids)) = node.get(b"Kids").ok().and_then(|k| deref(doc, k)) {
        for kid in kids {
            if let Some(Object::Dictionary(kid)) = deref(doc, kid) {
                if let Some(found) = search_name_tree(doc, kid, name, depth + 1) {
                    return Some(found);
                }
            }
        }
    }

    None
}

fn catalog(doc: &Document) -> Option<&Dictionary> {
    deref(doc, doc.trailer.get(b"Root").ok()?)?.as_dict().ok()
}

/// Follow one level of indirection.
fn deref<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}
