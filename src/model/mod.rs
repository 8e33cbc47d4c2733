//! Data models for the annotation editor.

mod shape;
mod store;

pub use shape::{Geometry, Shape, ShapeKind, UnknownShapeKind};
pub use store::{Annotation, AnnotationSet, ShapeId};
