//! Annotation file import/export.
//!
//! Annotations are stored as one JSON document per image. Each document lists
//! the persisted shapes in draw order together with their class names; see
//! [`AnnotationDocument`] for the layout.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roi_annotator::format::{load_annotations, save_annotations};
//!
//! let imported = load_annotations(path)?;
//! for warning in &imported.warnings {
//!     log::warn!("{}", warning);
//! }
//! let set = AnnotationSet::from_shapes(imported.shapes);
//! save_annotations(path, &set)?;
//! ```

mod codec;
mod document;
mod error;
mod result;

#[cfg(test)]
mod tests;

pub use codec::{deserialize, from_json, load_annotations, save_annotations, serialize, to_json};
pub use document::{AnnotationDocument, ObjectEntry};
pub use error::FormatError;
pub use result::{ExportResult, FormatWarning, ImportResult, WarningSeverity};
