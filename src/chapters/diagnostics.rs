//! Diagnostic line collection
//!
//! Every recoverable problem hit while splitting is recorded here, returned
//! to the caller with the result, and mirrored to `tracing`.

/// Ordered warning and error lines gathered during one split
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    lines: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recoverable problem
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.lines.push(format!("Warning: {}", message));
    }

    /// Record a failure that cut a step short
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.lines.push(format!("Error: {}", message));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
