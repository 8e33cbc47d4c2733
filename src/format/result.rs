//! Results and warnings produced by annotation file operations.

use std::path::PathBuf;

use crate::model::Shape;

/// Shapes recovered from an annotation document.
#[derive(Debug, Default)]
pub struct ImportResult {
    /// Shapes in document order.
    pub shapes: Vec<Shape>,

    /// Entries that were skipped or adjusted.
    pub warnings: Vec<FormatWarning>,
}

impl ImportResult {
    /// Create an empty import result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the result.
    pub fn add_warning(&mut self, warning: FormatWarning) {
        self.warnings.push(warning);
    }

    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Summary of a save operation.
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Number of entries written to the document.
    pub shapes_written: usize,

    /// Shapes that have no file representation (lines).
    pub warnings: Vec<FormatWarning>,

    /// File written, if the export went to disk.
    pub path: Option<PathBuf>,
}

impl ExportResult {
    /// Create an empty export result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the result.
    pub fn add_warning(&mut self, warning: FormatWarning) {
        self.warnings.push(warning);
    }

    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Warning generated while converting between shapes and documents.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatWarning {
    /// Position of the offending entry in the `objects` array, if any.
    pub entry_index: Option<usize>,

    /// Human-readable warning message.
    pub message: String,

    /// Severity level of the warning.
    pub severity: WarningSeverity,
}

impl FormatWarning {
    /// Create a new warning.
    pub fn new(message: impl Into<String>, severity: WarningSeverity) -> Self {
        Self {
            entry_index: None,
            message: message.into(),
            severity,
        }
    }

    /// Create an info-level warning.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Info)
    }

    /// Create a warning-level warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Warning)
    }

    /// Attach the index of the entry this warning relates to.
    pub fn at_entry(mut self, index: usize) -> Self {
        self.entry_index = Some(index);
        self
    }
}

impl std::fmt::Display for FormatWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.entry_index {
            Some(index) => write!(f, "[{:?}] entry {}: {}", self.severity, index, self.message),
            None => write!(f, "[{:?}] {}", self.severity, self.message),
        }
    }
}

/// Severity level for format warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    /// Informational message, not a problem.
    Info,
    /// Something was skipped or modified.
    Warning,
}
