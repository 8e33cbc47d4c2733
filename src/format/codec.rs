//! Conversion between an [`AnnotationSet`] and annotation documents.
//!
//! Coordinates per shape kind:
//!
//! | Shape     | Coordinates                              |
//! |-----------|------------------------------------------|
//! | Rectangle | `[x, y, width, height]` (unrotated)      |
//! | Trapezoid | `[x0, y0, .., x3, y3]`, rotation applied |
//! | Polygon   | `[x0, y0, x1, y1, ..]`, at least 3 points |
//!
//! Lines have no file representation and are left out on save.

use std::path::Path;

use crate::constants::MIN_POLYGON_VERTICES;
use crate::format::document::{AnnotationDocument, ObjectEntry, parse_lenient};
use crate::format::error::FormatError;
use crate::format::result::{ExportResult, FormatWarning, ImportResult};
use crate::geometry::{Point, Rect};
use crate::model::{AnnotationSet, Geometry, Shape, ShapeKind};
use crate::persist::write_atomic;

/// Build the document for a set, in draw order.
pub fn serialize(set: &AnnotationSet) -> AnnotationDocument {
    export(set).0
}

/// Rebuild shapes from a document, skipping entries that can't be used.
pub fn deserialize(document: &AnnotationDocument) -> ImportResult {
    let mut result = ImportResult::new();
    decode_entries(document.objects.iter().enumerate(), &mut result);

    log::debug!(
        "Decoded {} of {} entries (TotalShapes {})",
        result.shapes.len(),
        document.objects.len(),
        document.total_shapes
    );
    result
}

fn decode_entries<'a>(
    entries: impl Iterator<Item = (usize, &'a ObjectEntry)>,
    result: &mut ImportResult,
) {
    for (index, entry) in entries {
        match decode_entry(entry) {
            Ok(shape) => result.shapes.push(shape),
            Err(message) => {
                log::warn!("Skipping annotation entry {}: {}", index, message);
                result.add_warning(FormatWarning::warning(message).at_entry(index));
            }
        }
    }
}

/// Serialize a set to pretty-printed JSON.
pub fn to_json(set: &AnnotationSet) -> Result<String, FormatError> {
    serialize(set).to_json()
}

/// Parse JSON text into shapes.
pub fn from_json(json: &str) -> Result<ImportResult, FormatError> {
    let parsed = parse_lenient(json)?;
    let mut result = ImportResult {
        shapes: Vec::with_capacity(parsed.entries.len()),
        warnings: parsed.warnings,
    };
    decode_entries(parsed.entries.iter().map(|(i, e)| (*i, e)), &mut result);

    if result.shapes.len() > parsed.total_shapes {
        log::debug!(
            "Document holds {} shapes but TotalShapes says {}",
            result.shapes.len(),
            parsed.total_shapes
        );
    }
    Ok(result)
}

/// Read an annotation file.
pub fn load_annotations(path: &Path) -> Result<ImportResult, FormatError> {
    log::info!("Loading annotations from {:?}", path);

    let json = std::fs::read_to_string(path)?;
    let result = from_json(&json)?;

    log::info!(
        "Loaded {} shapes from {:?} ({} warnings)",
        result.shapes.len(),
        path,
        result.warnings.len()
    );
    Ok(result)
}

/// Write an annotation file, replacing any existing one atomically.
pub fn save_annotations(path: &Path, set: &AnnotationSet) -> Result<ExportResult, FormatError> {
    log::info!("Saving annotations to {:?}", path);

    let (document, mut result) = export(set);
    let json = document.to_json()?;
    write_atomic(path, json.as_bytes())?;
    result.path = Some(path.to_path_buf());

    log::info!(
        "Saved {} of {} shapes to {:?}",
        result.shapes_written,
        document.total_shapes,
        path
    );
    Ok(result)
}

fn export(set: &AnnotationSet) -> (AnnotationDocument, ExportResult) {
    let mut result = ExportResult::new();
    let mut objects = Vec::with_capacity(set.len());

    for annotation in set.all() {
        match encode_shape(annotation.shape()) {
            Some(entry) => objects.push(entry),
            None => {
                result.add_warning(FormatWarning::info(format!(
                    "{} {} is not saved to annotation files",
                    annotation.shape().kind(),
                    annotation.id()
                )));
            }
        }
    }

    result.shapes_written = objects.len();
    let document = AnnotationDocument {
        total_shapes: set.len(),
        objects,
    };
    (document, result)
}

fn flatten(points: &[Point]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

fn unflatten(coordinates: &[f64]) -> Vec<Point> {
    coordinates
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

fn encode_shape(shape: &Shape) -> Option<ObjectEntry> {
    let coordinates = match &shape.geometry {
        Geometry::Line { .. } => return None,
        Geometry::Rectangle { bounds, .. } => {
            vec![bounds.x, bounds.y, bounds.width, bounds.height]
        }
        Geometry::Trapezoid { .. } => flatten(&shape.scene_vertices()),
        Geometry::Polygon { vertices } => flatten(vertices),
    };
    Some(ObjectEntry::new(
        shape.class_name.clone(),
        shape.kind().name(),
        coordinates,
    ))
}

fn decode_entry(entry: &ObjectEntry) -> Result<Shape, String> {
    let kind: ShapeKind = entry.shape.parse().map_err(|e| format!("{}", e))?;
    let coords = &entry.coordinates;

    if coords.iter().any(|c| !c.is_finite()) {
        return Err(format!("{} has non-finite coordinates", kind));
    }

    let geometry = match kind {
        ShapeKind::Rectangle => match coords.as_slice() {
            [x, y, w, h] => Geometry::Rectangle {
                bounds: Rect::from_corners(Point::new(*x, *y), Point::new(x + w, y + h)),
                rotation_degrees: 0.0,
            },
            _ => return Err(wrong_count(kind, coords.len(), "exactly 4")),
        },
        ShapeKind::Trapezoid => {
            let points = unflatten(coords);
            match <[Point; 4]>::try_from(points) {
                Ok(vertices) if coords.len() == 8 => Geometry::Trapezoid {
                    vertices,
                    rotation_degrees: 0.0,
                },
                _ => return Err(wrong_count(kind, coords.len(), "exactly 8")),
            }
        }
        ShapeKind::Polygon => {
            if coords.len() % 2 != 0 || coords.len() < MIN_POLYGON_VERTICES * 2 {
                return Err(wrong_count(kind, coords.len(), "an even number of at least 6"));
            }
            Geometry::Polygon {
                vertices: unflatten(coords),
            }
        }
        ShapeKind::Line => return Err("Line shapes are not stored in annotation files".into()),
    };

    Ok(Shape::new(entry.object.clone(), geometry))
}

fn wrong_count(kind: ShapeKind, found: usize, expected: &str) -> String {
    format!("{} needs {} coordinates, found {}", kind, expected, found)
}
