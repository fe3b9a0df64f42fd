//! Outline-driven chapter splitting
//!
//! [`split_document`] turns PDF bytes into one PDF per top-level outline
//! entry plus a text and JSON table of contents. Problems with individual
//! entries or slices become warnings; only unreadable input (or a panic)
//! fails the whole call, and even then a [`ProcessingResult`] is returned.

mod diagnostics;
mod ranges;
mod slice;
mod slug;
mod toc;

#[cfg(test)]
pub(crate) mod testing;

pub use diagnostics::Diagnostics;
pub use ranges::{outline_to_ranges, ChapterRange};
pub use slice::{create_slice, ChapterArtifact};
pub use slug::{chapter_slug, slugify};
pub use toc::{create_toc_json, create_toc_text, toc_entries, TextToc, TocEntry, TOC_HEADER};

use crate::pdf::{PdfDocument, SourceDocument};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

/// Display name used when the caller gives none
pub const DEFAULT_INPUT_NAME: &str = "input.pdf";

/// Extension appended to chapter slugs
pub const CHAPTER_EXTENSION: &str = ".pdf";

/// Outcome of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Everything a split produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub status: Status,
    /// Human-readable progress and summary, possibly multi-line
    pub message: String,
    pub toc_text: String,
    pub toc_json: String,
    pub chapters: Vec<ChapterArtifact>,
    /// TOC lines as they were emitted while rendering the text TOC
    pub console_log: String,
    /// Every diagnostic line recorded during the split
    pub warnings: Vec<String>,
}

impl Default for ProcessingResult {
    fn default() -> Self {
        Self {
            status: Status::Error,
            message: "Processing started...".to_string(),
            toc_text: String::new(),
            toc_json: String::new(),
            chapters: Vec::new(),
            console_log: String::new(),
            warnings: Vec::new(),
        }
    }
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Split raw PDF bytes into chapters.
///
/// `original_name` only appears in messages and defaults to `input.pdf`.
/// Never panics and never returns an error: failures are reported through
/// [`ProcessingResult::status`] and [`ProcessingResult::message`].
pub fn split_document(data: &[u8], original_name: Option<&str>) -> ProcessingResult {
    let name = original_name.unwrap_or(DEFAULT_INPUT_NAME);
    guarded(|| {
        let doc = PdfDocument::open_bytes(data)?;
        run_pipeline(&doc, name)
    })
}

/// Split an already opened document
pub fn split_source<D: SourceDocument + ?Sized>(doc: &D, name: &str) -> ProcessingResult {
    guarded(|| run_pipeline(doc, name))
}

thread_local! {
    /// Trace of the most recent panic on this thread
    static PANIC_TRACE: Cell<Option<Backtrace>> = const { Cell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chain a hook that records where a panic happened, then defers to the
/// previously installed hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            PANIC_TRACE.with(|trace| trace.set(Some(Backtrace::force_capture())));
            previous(info);
        }));
    });
}

fn guarded<F>(pipeline: F) -> ProcessingResult
where
    F: FnOnce() -> anyhow::Result<ProcessingResult>,
{
    install_panic_hook();
    PANIC_TRACE.with(Cell::take);

    let (err, trace) = match panic::catch_unwind(AssertUnwindSafe(pipeline)) {
        Ok(Ok(result)) => return result,
        Ok(Err(err)) => (err, Backtrace::force_capture()),
        Err(payload) => {
            let trace = PANIC_TRACE
                .with(Cell::take)
                .unwrap_or_else(Backtrace::force_capture);
            let err = anyhow::anyhow!("PDF processing panicked: {}", panic_message(&*payload));
            (err, trace)
        }
    };

    tracing::error!("Error: {:#}", err);
    ProcessingResult {
        message: format!(
            "Error processing PDF: {}\n{:#}\n\nStack backtrace:\n{}",
            err, err, trace
        ),
        ..ProcessingResult::default()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

fn run_pipeline<D: SourceDocument + ?Sized>(
    doc: &D,
    name: &str,
) -> anyhow::Result<ProcessingResult> {
    let mut diagnostics = Diagnostics::new();
    let mut result = ProcessingResult {
        message: format!("Processing '{}'...", name),
        ..ProcessingResult::default()
    };
    tracing::info!(name, pages = doc.page_count(), "splitting PDF");

    let toc = create_toc_text(doc, &mut diagnostics);
    result.toc_text = toc.text;
    result.console_log = toc.console_log;
    result.toc_json = create_toc_json(doc, &mut diagnostics)?;

    let ranges = outline_to_ranges(doc, &mut diagnostics);
    if ranges.is_empty() {
        result
            .message
            .push_str("\nWarning: No valid outline items found or usable to define chapter ranges.");
        result.status = Status::Success;
        result.warnings = diagnostics.into_lines();
        return Ok(result);
    }

    let mut slice_warnings = Vec::new();
    for range in &ranges {
        match create_slice(doc, range, &mut diagnostics) {
            Some(artifact) => result.chapters.push(artifact),
            None => {
                tracing::warn!("Skipping empty or errored slice: {}", range.slug);
                slice_warnings.push(format!(
                    "Warning: Slice '{}' could not be generated or was empty.",
                    range.slug
                ));
            }
        }
    }

    result.status = Status::Success;
    result.message = format!(
        "Successfully processed '{}'. Found {} chapters.",
        name,
        result.chapters.len()
    );
    for warning in slice_warnings {
        result.message.push('\n');
        result.message.push_str(&warning);
    }
    result.warnings = diagnostics.into_lines();

    tracing::info!(name, chapters = result.chapters.len(), "split complete");
    Ok(result)
}
