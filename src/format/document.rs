//! On-disk layout of annotation files.
//!
//! ```json
//! {
//!   "TotalShapes": 2,
//!   "objects": [
//!     { "object": "Car", "shape": "Rectangle", "coordinates": [10, 10, 100, 50] },
//!     { "object": "Tree", "shape": "Polygon", "coordinates": [0, 0, 10, 0, 10, 10] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::format::error::FormatError;
use crate::format::result::FormatWarning;

/// A complete annotation document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotationDocument {
    /// Number of shapes the set held when it was saved.
    #[serde(rename = "TotalShapes", default)]
    pub total_shapes: usize,

    /// One entry per persisted shape, in draw order.
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
}

/// A single persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Class label.
    #[serde(default)]
    pub object: String,

    /// Shape kind name (`Rectangle`, `Trapezoid` or `Polygon`).
    pub shape: String,

    /// Flattened coordinates; meaning depends on `shape`.
    pub coordinates: Vec<f64>,
}

impl ObjectEntry {
    pub fn new(object: impl Into<String>, shape: impl Into<String>, coordinates: Vec<f64>) -> Self {
        Self {
            object: object.into(),
            shape: shape.into(),
            coordinates,
        }
    }
}

/// Document whose entries have not been validated yet.
#[derive(Deserialize)]
struct LenientDocument {
    #[serde(rename = "TotalShapes", default)]
    total_shapes: Option<serde_json::Value>,
    #[serde(default)]
    objects: Vec<serde_json::Value>,
}

/// Entries that parsed, each with its position in the `objects` array.
pub(crate) struct ParsedDocument {
    pub total_shapes: usize,
    pub entries: Vec<(usize, ObjectEntry)>,
    pub warnings: Vec<FormatWarning>,
}

/// Parse a document, skipping entries that don't have the expected shape.
///
/// Only a document that is not a JSON object at all is an error; broken
/// entries are dropped and reported as warnings.
pub(crate) fn parse_lenient(json: &str) -> Result<ParsedDocument, FormatError> {
    let raw: LenientDocument = serde_json::from_str(json)?;
    let mut warnings = Vec::new();

    let total_shapes = match raw.total_shapes {
        None => 0,
        Some(value) => match value.as_u64() {
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
            None => {
                warnings.push(FormatWarning::info(format!(
                    "Ignoring non-numeric TotalShapes value {}",
                    value
                )));
                0
            }
        },
    };

    let mut entries = Vec::with_capacity(raw.objects.len());
    for (index, value) in raw.objects.into_iter().enumerate() {
        match serde_json::from_value::<ObjectEntry>(value) {
            Ok(entry) => entries.push((index, entry)),
            Err(e) => {
                log::warn!("Skipping malformed annotation entry {}: {}", index, e);
                warnings.push(
                    FormatWarning::warning(format!("Malformed entry skipped: {}", e))
                        .at_entry(index),
                );
            }
        }
    }

    Ok(ParsedDocument {
        total_shapes,
        entries,
        warnings,
    })
}

impl AnnotationDocument {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document leniently; see [`from_json`](crate::format::from_json)
    /// for turning it into shapes directly.
    pub fn from_json(json: &str) -> Result<(Self, Vec<FormatWarning>), FormatError> {
        let parsed = parse_lenient(json)?;
        let document = Self {
            total_shapes: parsed.total_shapes,
            objects: parsed.entries.into_iter().map(|(_, entry)| entry).collect(),
        };
        Ok((document, parsed.warnings))
    }
}
