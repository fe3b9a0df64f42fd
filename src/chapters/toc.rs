//! Table of contents rendering
//!
//! The text form walks the whole outline tree. The JSON form lists only
//! top-level entries, matching the chapters the splitter produces.

use super::diagnostics::Diagnostics;
use super::ranges::resolve_page;
use crate::error::{Error, Result};
use crate::pdf::outline::MAX_OUTLINE_DEPTH;
use crate::pdf::{OutlineNode, SourceDocument};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// First line of every text TOC
pub const TOC_HEADER: &str = "Table of Contents:";

/// Indent added per nesting level
const INDENT_WIDTH: usize = 2;

/// Rendered text TOC
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextToc {
    /// Header followed by one line per resolved entry
    pub text: String,
    /// The entry lines alone, without header or error text
    pub console_log: String,
}

/// Top-level TOC entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TocEntry {
    /// 1-based position among top-level entries
    pub chapter: usize,
    pub title: String,
    /// 1-based page number
    pub page: u32,
}

/// Render the full outline as indented text.
///
/// Unresolved entries are left out with a warning. If the walk fails, the
/// lines collected so far are kept and an error line is appended.
pub fn create_toc_text<D: SourceDocument + ?Sized>(
    doc: &D,
    diagnostics: &mut Diagnostics,
) -> TextToc {
    let mut lines = vec![TOC_HEADER.to_string()];
    let mut console = Vec::new();

    if let Err(e) = collect_lines(doc, doc.outline(), 0, &mut lines, &mut console, diagnostics) {
        diagnostics.error(format!("Error generating text TOC: {}", e));
        lines.push(format!("\nError generating TOC: {}", e));
    }

    for line in &lines {
        tracing::info!("{}", line);
    }

    TextToc {
        text: lines.join("\n"),
        console_log: console.join("\n"),
    }
}

fn collect_lines<D: SourceDocument + ?Sized>(
    doc: &D,
    nodes: &[OutlineNode],
    depth: usize,
    lines: &mut Vec<String>,
    console: &mut Vec<String>,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    if depth >= MAX_OUTLINE_DEPTH {
        return Err(Error::OutlineTooDeep {
            depth: MAX_OUTLINE_DEPTH,
        });
    }

    for node in nodes {
        match node {
            OutlineNode::Group(children) => {
                collect_lines(doc, children, depth + 1, lines, console, diagnostics)?;
            }
            OutlineNode::Leaf(leaf) => {
                if let Some(page) = resolve_page(doc, leaf, "outline item", diagnostics) {
                    let line = format!(
                        "{:indent$}- {} (p{})",
                        "",
                        leaf.title,
                        page + 1,
                        indent = depth * INDENT_WIDTH
                    );
                    lines.push(line.clone());
                    console.push(line);
                }
            }
        }
    }

    Ok(())
}

/// Resolved top-level entries, numbered by their position among top-level leaves
pub fn toc_entries<D: SourceDocument + ?Sized>(
    doc: &D,
    diagnostics: &mut Diagnostics,
) -> Vec<TocEntry> {
    doc.outline()
        .iter()
        .filter_map(OutlineNode::as_leaf)
        .enumerate()
        .filter_map(|(i, leaf)| {
            resolve_page(doc, leaf, "TOC item", diagnostics).map(|page| TocEntry {
                chapter: i + 1,
                title: leaf.title.clone(),
                page: page + 1,
            })
        })
        .collect()
}

/// Top-level entries as a pretty-printed JSON array
pub fn create_toc_json<D: SourceDocument + ?Sized>(
    doc: &D,
    diagnostics: &mut Diagnostics,
) -> Result<String> {
    let entries = toc_entries(doc, diagnostics);
    Ok(serde_json::to_string_pretty(&entries)?)
}
