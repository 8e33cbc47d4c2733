//! Shape data model for annotations.

use std::fmt;
use std::str::FromStr;

use crate::constants::TRAPEZOID_INSET_DIVISOR;
use crate::geometry::{
    Point, Rect, bounding_rect, distance_to_segment, polygon_contains, rotate_about,
};

/// The kind of a shape, without its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Trapezoid,
    Polygon,
}

impl ShapeKind {
    /// Name used in annotation files and logs.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Line => "Line",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Trapezoid => "Trapezoid",
            ShapeKind::Polygon => "Polygon",
        }
    }

    /// Whether shapes of this kind carry a rotation angle.
    pub fn is_rotatable(&self) -> bool {
        matches!(self, ShapeKind::Rectangle | ShapeKind::Trapezoid)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown shape kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shape kind '{0}'")]
pub struct UnknownShapeKind(pub String);

impl FromStr for ShapeKind {
    type Err = UnknownShapeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Line" => Ok(ShapeKind::Line),
            "Rectangle" => Ok(ShapeKind::Rectangle),
            "Trapezoid" => Ok(ShapeKind::Trapezoid),
            "Polygon" => Ok(ShapeKind::Polygon),
            other => Err(UnknownShapeKind(other.to_string())),
        }
    }
}

/// Geometry of a shape, in scene coordinates.
///
/// Rotations are in degrees and applied about the center of the unrotated
/// bounding box.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A straight segment.
    Line { origin: Point, end: Point },
    /// A rectangle given by its unrotated bounds.
    Rectangle { bounds: Rect, rotation_degrees: f64 },
    /// A four-vertex convex polygon.
    Trapezoid {
        vertices: [Point; 4],
        rotation_degrees: f64,
    },
    /// A free polygon, vertices in draw order.
    Polygon { vertices: Vec<Point> },
}

/// A labelled annotation shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Class label assigned when the shape was created. May be empty.
    pub class_name: String,
    /// The shape geometry.
    pub geometry: Geometry,
}

impl Shape {
    pub fn new(class_name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            class_name: class_name.into(),
            geometry,
        }
    }

    pub fn line(class_name: impl Into<String>, origin: Point, end: Point) -> Self {
        Self::new(class_name, Geometry::Line { origin, end })
    }

    pub fn rectangle(class_name: impl Into<String>, bounds: Rect) -> Self {
        Self::new(
            class_name,
            Geometry::Rectangle {
                bounds,
                rotation_degrees: 0.0,
            },
        )
    }

    pub fn trapezoid(class_name: impl Into<String>, vertices: [Point; 4]) -> Self {
        Self::new(
            class_name,
            Geometry::Trapezoid {
                vertices,
                rotation_degrees: 0.0,
            },
        )
    }

    /// Isosceles trapezoid template inscribed in `bounds`: the top edge is
    /// inset on both sides, the bottom edge spans the full width.
    pub fn trapezoid_in(class_name: impl Into<String>, bounds: Rect) -> Self {
        let inset = bounds.width / TRAPEZOID_INSET_DIVISOR;
        Self::trapezoid(
            class_name,
            [
                Point::new(bounds.left() + inset, bounds.top()),
                Point::new(bounds.right() - inset, bounds.top()),
                Point::new(bounds.right(), bounds.bottom()),
                Point::new(bounds.left(), bounds.bottom()),
            ],
        )
    }

    pub fn polygon(class_name: impl Into<String>, vertices: Vec<Point>) -> Self {
        Self::new(class_name, Geometry::Polygon { vertices })
    }

    pub fn kind(&self) -> ShapeKind {
        match &self.geometry {
            Geometry::Line { .. } => ShapeKind::Line,
            Geometry::Rectangle { .. } => ShapeKind::Rectangle,
            Geometry::Trapezoid { .. } => ShapeKind::Trapezoid,
            Geometry::Polygon { .. } => ShapeKind::Polygon,
        }
    }

    /// Current rotation in degrees (zero for kinds that don't rotate).
    pub fn rotation_degrees(&self) -> f64 {
        match &self.geometry {
            Geometry::Rectangle {
                rotation_degrees, ..
            }
            | Geometry::Trapezoid {
                rotation_degrees, ..
            } => *rotation_degrees,
            Geometry::Line { .. } | Geometry::Polygon { .. } => 0.0,
        }
    }

    /// Set an absolute rotation. Returns false for kinds that don't rotate.
    pub fn set_rotation(&mut self, degrees: f64) -> bool {
        match &mut self.geometry {
            Geometry::Rectangle {
                rotation_degrees, ..
            }
            | Geometry::Trapezoid {
                rotation_degrees, ..
            } => {
                *rotation_degrees = degrees;
                true
            }
            Geometry::Line { .. } | Geometry::Polygon { .. } => false,
        }
    }

    /// Vertices in the shape's own (unrotated) frame.
    pub fn local_vertices(&self) -> Vec<Point> {
        match &self.geometry {
            Geometry::Line { origin, end } => vec![*origin, *end],
            Geometry::Rectangle { bounds, .. } => vec![
                bounds.top_left(),
                Point::new(bounds.right(), bounds.top()),
                Point::new(bounds.right(), bounds.bottom()),
                Point::new(bounds.left(), bounds.bottom()),
            ],
            Geometry::Trapezoid { vertices, .. } => vertices.to_vec(),
            Geometry::Polygon { vertices } => vertices.clone(),
        }
    }

    /// Unrotated bounding box. An empty polygon yields a zero rect.
    pub fn bounds(&self) -> Rect {
        match &self.geometry {
            Geometry::Rectangle { bounds, .. } => *bounds,
            _ => bounding_rect(&self.local_vertices()).unwrap_or_default(),
        }
    }

    /// The point rotations are applied about.
    pub fn pivot(&self) -> Point {
        self.bounds().center()
    }

    /// Map a scene point into the shape's unrotated frame.
    pub fn to_local(&self, point: Point) -> Point {
        let rotation = self.rotation_degrees();
        if rotation == 0.0 {
            return point;
        }
        rotate_about(point, self.pivot(), -rotation)
    }

    /// Vertices as they appear on the scene, rotation applied.
    pub fn scene_vertices(&self) -> Vec<Point> {
        let rotation = self.rotation_degrees();
        let local = self.local_vertices();
        if rotation == 0.0 {
            return local;
        }
        let pivot = self.pivot();
        local
            .into_iter()
            .map(|p| rotate_about(p, pivot, rotation))
            .collect()
    }

    /// Bounding box of the shape as drawn on the scene.
    pub fn scene_bounds(&self) -> Rect {
        bounding_rect(&self.scene_vertices()).unwrap_or_default()
    }

    /// Check if a scene point hits this shape.
    ///
    /// Lines (and polygons too small to have an interior) are hit within
    /// `tolerance` of their outline.
    pub fn contains_point(&self, point: Point, tolerance: f64) -> bool {
        let local = self.to_local(point);
        match &self.geometry {
            Geometry::Line { origin, end } => {
                distance_to_segment(local, *origin, *end) <= tolerance
            }
            Geometry::Rectangle { bounds, .. } => bounds.contains(&local),
            Geometry::Trapezoid { vertices, .. } => polygon_contains(vertices, local),
            Geometry::Polygon { vertices } => match vertices.len() {
                0 => false,
                1 => vertices[0].distance_to(&local) <= tolerance,
                2 => distance_to_segment(local, vertices[0], vertices[1]) <= tolerance,
                _ => polygon_contains(vertices, local),
            },
        }
    }

    /// Move the whole shape by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match &mut self.geometry {
            Geometry::Line { origin, end } => {
                *origin = origin.offset(dx, dy);
                *end = end.offset(dx, dy);
            }
            Geometry::Rectangle { bounds, .. } => *bounds = bounds.translated(dx, dy),
            Geometry::Trapezoid { vertices, .. } => {
                for v in vertices.iter_mut() {
                    *v = v.offset(dx, dy);
                }
            }
            Geometry::Polygon { vertices } => {
                for v in vertices.iter_mut() {
                    *v = v.offset(dx, dy);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_kind_names_parse_back() {
        for kind in [
            ShapeKind::Line,
            ShapeKind::Rectangle,
            ShapeKind::Trapezoid,
            ShapeKind::Polygon,
        ] {
            assert_eq!(kind.name().parse::<ShapeKind>(), Ok(kind));
        }
        assert!("Ellipse".parse::<ShapeKind>().is_err());
    }

    #[test]
    fn test_trapezoid_template() {
        let shape = Shape::trapezoid_in("Car", Rect::new(0.0, 0.0, 60.0, 30.0));
        assert_eq!(shape.kind(), ShapeKind::Trapezoid);
        assert_eq!(
            shape.local_vertices(),
            vec![
                Point::new(10.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(60.0, 30.0),
                Point::new(0.0, 30.0),
            ]
        );
        assert_eq!(shape.bounds(), Rect::new(0.0, 0.0, 60.0, 30.0));
    }

    #[test]
    fn test_only_rectangles_and_trapezoids_rotate() {
        let mut rect = Shape::rectangle("", Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(rect.set_rotation(30.0));
        assert_eq!(rect.rotation_degrees(), 30.0);

        let mut poly = Shape::polygon("", vec![Point::new(0.0, 0.0)]);
        assert!(!poly.set_rotation(30.0));
        assert_eq!(poly.rotation_degrees(), 0.0);
    }

    #[test]
    fn test_rotated_rectangle_hit_test() {
        let mut rect = Shape::rectangle("", Rect::new(0.0, 40.0, 100.0, 20.0));
        // Unrotated: a point well above the band misses
        assert!(!rect.contains_point(Point::new(50.0, 10.0), 0.0));

        // Rotated upright about (50, 50) the band now covers x in [40, 60]
        rect.set_rotation(90.0);
        assert!(rect.contains_point(Point::new(50.0, 10.0), 0.0));
        assert!(!rect.contains_point(Point::new(10.0, 50.0), 0.0));
    }

    #[test]
    fn test_scene_vertices_apply_rotation() {
        let mut rect = Shape::rectangle("", Rect::new(-10.0, -5.0, 20.0, 10.0));
        rect.set_rotation(90.0);
        let vertices = rect.scene_vertices();
        // Top-left (-10, -5) rotated by 90 degrees about the origin
        assert!((vertices[0].x - 5.0).abs() < EPS);
        assert!((vertices[0].y + 10.0).abs() < EPS);

        let bounds = rect.scene_bounds();
        assert!((bounds.width - 10.0).abs() < EPS);
        assert!((bounds.height - 20.0).abs() < EPS);
    }

    #[test]
    fn test_line_hit_uses_tolerance() {
        let line = Shape::line("", Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.contains_point(Point::new(50.0, 3.0), 4.0));
        assert!(!line.contains_point(Point::new(50.0, 5.0), 4.0));
    }

    #[test]
    fn test_translate_moves_every_vertex() {
        let mut poly = Shape::polygon(
            "Tree",
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
            ],
        );
        poly.translate(5.0, -2.0);
        assert_eq!(
            poly.local_vertices(),
            vec![
                Point::new(5.0, -2.0),
                Point::new(15.0, -2.0),
                Point::new(15.0, 8.0),
            ]
        );
        assert_eq!(poly.class_name, "Tree");
    }
}
