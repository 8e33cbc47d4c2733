//! Shape editing operations driven by the pointer.
//!
//! Each function computes the edited geometry and returns `None` when the
//! edit would produce an invalid shape, in which case the caller keeps the
//! previous geometry.

use crate::constants::MIN_SHAPE_SIZE;
use crate::geometry::{
    Point, Rect, is_convex, nearest_corner, nearest_vertex_index, rotate_about, rotation_angle,
};
use crate::model::{AnnotationSet, Geometry, Shape, ShapeId};

/// Resize `shape` by moving its handle nearest to `pointer` onto the pointer.
///
/// - Rectangle: the nearest corner moves; rejected below [`MIN_SHAPE_SIZE`].
/// - Polygon: the nearest vertex moves.
/// - Trapezoid: the nearest vertex moves; rejected unless still convex.
/// - Line: the nearer endpoint moves.
///
/// Rotated shapes are edited in their unrotated frame and then shifted so
/// every handle that did not move stays where it was on the scene.
pub fn resize_towards(shape: &Shape, pointer: Point) -> Option<Geometry> {
    let local = shape.to_local(pointer);
    let edited = resize_local(shape, local)?;
    Some(keep_in_place(shape, edited))
}

fn resize_local(shape: &Shape, local: Point) -> Option<Geometry> {
    match &shape.geometry {
        Geometry::Rectangle {
            bounds,
            rotation_degrees,
        } => {
            let corner = nearest_corner(bounds, local);
            let resized = bounds.with_corner(corner, local);
            if resized.width < MIN_SHAPE_SIZE || resized.height < MIN_SHAPE_SIZE {
                log::trace!(
                    "Edit rejected: rectangle would be {:.1}x{:.1}",
                    resized.width,
                    resized.height
                );
                return None;
            }
            Some(Geometry::Rectangle {
                bounds: resized,
                rotation_degrees: *rotation_degrees,
            })
        }
        Geometry::Polygon { vertices } => {
            let idx = nearest_vertex_index(vertices, local)?;
            let mut moved = vertices.clone();
            moved[idx] = local;
            Some(Geometry::Polygon { vertices: moved })
        }
        Geometry::Trapezoid {
            vertices,
            rotation_degrees,
        } => {
            let idx = nearest_vertex_index(vertices, local)?;
            let mut moved = *vertices;
            moved[idx] = local;
            if !is_convex(&moved) {
                log::trace!("Edit rejected: trapezoid vertex {} would make it concave", idx);
                return None;
            }
            Some(Geometry::Trapezoid {
                vertices: moved,
                rotation_degrees: *rotation_degrees,
            })
        }
        Geometry::Line { origin, end } => {
            if end.distance_to(&local) < origin.distance_to(&local) {
                Some(Geometry::Line {
                    origin: *origin,
                    end: local,
                })
            } else {
                Some(Geometry::Line {
                    origin: local,
                    end: *end,
                })
            }
        }
    }
}

/// Shift `edited` so it rotates about the same scene point as `shape` did.
///
/// Rotation is applied about the center of the unrotated bounds, which moves
/// when a handle is dragged. Translating by the pivot's displacement keeps
/// every untouched vertex fixed on the scene.
fn keep_in_place(shape: &Shape, edited: Geometry) -> Geometry {
    let rotation = shape.rotation_degrees();
    if rotation == 0.0 {
        return edited;
    }

    let mut moved = Shape::new(String::new(), edited);
    let pivot = moved.pivot();
    let target = rotate_about(pivot, shape.pivot(), rotation);
    moved.translate(target.x - pivot.x, target.y - pivot.y);
    moved.geometry
}

/// A rotation of the selected shapes, anchored at the state they had when
/// it started.
///
/// The pivot is the center of the union of the shapes' unrotated bounds.
/// The angle is absolute: on every pointer move each shape gets exactly the
/// angle from the pivot to the pointer, and its center orbits the pivot by
/// the difference to its starting angle. Nothing accumulates, so the same
/// pointer position always gives the same layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Rotation {
    pivot: Point,
    base: Vec<(ShapeId, Shape)>,
}

impl Rotation {
    /// Capture the selected rotatable shapes. `None` if there are none.
    pub fn capture(store: &AnnotationSet) -> Option<Self> {
        let base: Vec<(ShapeId, Shape)> = rotatable_selection(store)
            .into_iter()
            .filter_map(|id| store.get(id).map(|shape| (id, shape.clone())))
            .collect();

        let area = base
            .iter()
            .map(|(_, shape)| shape.bounds())
            .reduce(|acc, b| acc.union(&b))?;

        Some(Self {
            pivot: area.center(),
            base,
        })
    }

    pub fn pivot(&self) -> Point {
        self.pivot
    }

    /// Whether this rotation still covers exactly the selected rotatable shapes.
    pub fn matches(&self, store: &AnnotationSet) -> bool {
        let ids = rotatable_selection(store);
        ids.len() == self.base.len() && ids.iter().zip(&self.base).all(|(a, (b, _))| a == b)
    }

    /// Turn the captured shapes towards `pointer`. Returns the new angle.
    pub fn apply(&self, store: &mut AnnotationSet, pointer: Point) -> f64 {
        let theta = rotation_angle(self.pivot, pointer);

        for (id, base) in &self.base {
            let Some(shape) = store.get_mut(*id) else {
                continue;
            };
            let mut rotated = base.clone();
            let center = base.pivot();
            let orbited = rotate_about(center, self.pivot, theta - base.rotation_degrees());
            rotated.translate(orbited.x - center.x, orbited.y - center.y);
            rotated.set_rotation(theta);
            shape.geometry = rotated.geometry;
        }

        log::trace!(
            "Rotated {} shapes to {:.1} degrees about ({:.1}, {:.1})",
            self.base.len(),
            theta,
            self.pivot.x,
            self.pivot.y
        );
        theta
    }
}

fn rotatable_selection(store: &AnnotationSet) -> Vec<ShapeId> {
    store
        .selected_ids()
        .into_iter()
        .filter(|id| store.get(*id).is_some_and(|s| s.kind().is_rotatable()))
        .collect()
}

/// Validate a rubber-band drag as the bounds of a new rectangle/trapezoid.
pub fn drawn_bounds(origin: Point, end: Point) -> Option<Rect> {
    let bounds = Rect::from_corners(origin, end);
    if bounds.width < MIN_SHAPE_SIZE || bounds.height < MIN_SHAPE_SIZE {
        None
    } else {
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn trapezoid() -> Shape {
        Shape::trapezoid_in("Road", Rect::new(0.0, 0.0, 60.0, 30.0))
    }

    #[test]
    fn test_rectangle_corner_follows_pointer() {
        let shape = Shape::rectangle("", Rect::new(10.0, 10.0, 100.0, 50.0));
        let edited = resize_towards(&shape, Point::new(120.0, 70.0));
        assert_eq!(
            edited,
            Some(Geometry::Rectangle {
                bounds: Rect::new(10.0, 10.0, 110.0, 60.0),
                rotation_degrees: 0.0,
            })
        );
    }

    #[test]
    fn test_rectangle_too_small_is_rejected() {
        let shape = Shape::rectangle("", Rect::new(0.0, 0.0, 4.0, 4.0));
        // Bottom-right is nearest and would leave a 2.5-unit wide box
        assert_eq!(resize_towards(&shape, Point::new(2.5, 3.9)), None);
        // Exactly the minimum is still accepted
        assert!(resize_towards(&shape, Point::new(3.0, 3.9)).is_some());
    }

    #[test]
    fn test_trapezoid_rejects_concave_result() {
        let shape = trapezoid();
        // Pull the top-left vertex (10, 0) deep inside the shape
        assert_eq!(resize_towards(&shape, Point::new(30.0, 20.0)), None);
    }

    #[test]
    fn test_polygon_accepts_same_relocation() {
        let shape = Shape::polygon("Road", trapezoid().local_vertices());
        let edited = resize_towards(&shape, Point::new(30.0, 20.0));
        match edited {
            Some(Geometry::Polygon { vertices }) => {
                assert_eq!(vertices[0], Point::new(30.0, 20.0));
            }
            other => panic!("Expected polygon edit, got {:?}", other),
        }
    }

    #[test]
    fn test_trapezoid_accepts_convex_result() {
        let shape = trapezoid();
        match resize_towards(&shape, Point::new(5.0, -2.0)) {
            Some(Geometry::Trapezoid { vertices, .. }) => {
                assert_eq!(vertices[0], Point::new(5.0, -2.0));
            }
            other => panic!("Expected trapezoid edit, got {:?}", other),
        }
    }

    #[test]
    fn test_line_moves_nearer_endpoint() {
        let shape = Shape::line("", Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(
            resize_towards(&shape, Point::new(12.0, 3.0)),
            Some(Geometry::Line {
                origin: Point::new(0.0, 0.0),
                end: Point::new(12.0, 3.0),
            })
        );
    }

    #[test]
    fn test_rotation_is_absolute_not_incremental() {
        let mut store = AnnotationSet::new();
        let id = store.add(Shape::rectangle("", Rect::new(-10.0, -5.0, 20.0, 10.0)));
        store.select_only(id);
        let rotation = Rotation::capture(&store).unwrap();

        assert!((rotation.apply(&mut store, Point::new(0.0, 50.0)) - 90.0).abs() < EPS);
        assert!((store.get(id).unwrap().rotation_degrees() - 90.0).abs() < EPS);

        // Same pointer again: angle stays, it does not accumulate
        rotation.apply(&mut store, Point::new(0.0, 50.0));
        let shape = store.get(id).unwrap();
        assert!((shape.rotation_degrees() - 90.0).abs() < EPS);
        // Single shape rotates in place
        assert!(shape.pivot().distance_to(&Point::new(0.0, 0.0)) < EPS);
    }

    #[test]
    fn test_group_rotation_returns_to_same_layout() {
        let mut store = AnnotationSet::new();
        let a = store.add(Shape::rectangle("", Rect::new(0.0, 0.0, 40.0, 20.0)));
        let b = store.add(Shape::trapezoid_in("", Rect::new(100.0, 60.0, 30.0, 30.0)));
        store.set_selected(a, true);
        store.set_selected(b, true);
        let rotation = Rotation::capture(&store).unwrap();
        assert_eq!(rotation.pivot(), Point::new(65.0, 45.0));

        rotation.apply(&mut store, Point::new(300.0, 300.0));
        let first: Vec<Vec<Point>> = [a, b]
            .iter()
            .map(|id| store.get(*id).unwrap().scene_vertices())
            .collect();

        rotation.apply(&mut store, Point::new(-200.0, 50.0));
        rotation.apply(&mut store, Point::new(300.0, 300.0));
        for (id, expected) in [a, b].iter().zip(&first) {
            let again = store.get(*id).unwrap().scene_vertices();
            for (p, q) in again.iter().zip(expected) {
                assert!(p.distance_to(q) < EPS, "{:?} drifted from {:?}", p, q);
            }
        }
    }

    #[test]
    fn test_rotation_tracks_selection() {
        let mut store = AnnotationSet::new();
        let a = store.add(Shape::rectangle("", Rect::new(0.0, 0.0, 40.0, 20.0)));
        let b = store.add(Shape::rectangle("", Rect::new(50.0, 0.0, 40.0, 20.0)));
        store.select_only(a);
        let rotation = Rotation::capture(&store).unwrap();
        assert!(rotation.matches(&store));

        store.set_selected(b, true);
        assert!(!rotation.matches(&store));
    }

    #[test]
    fn test_rotation_skips_polygons() {
        let mut store = AnnotationSet::new();
        let id = store.add(Shape::polygon(
            "",
            vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(0.0, 5.0)],
        ));
        store.select_only(id);
        assert!(Rotation::capture(&store).is_none());
    }

    #[test]
    fn test_rotated_rectangle_edit_keeps_opposite_corner() {
        let mut shape = Shape::rectangle("", Rect::new(0.0, 0.0, 100.0, 50.0));
        shape.set_rotation(90.0);
        let before = shape.scene_vertices();
        let pointer = Point::new(15.0, 85.0);

        shape.geometry = resize_towards(&shape, pointer).unwrap();
        let after = shape.scene_vertices();

        // Bottom-right (index 2) was nearest; top-left stays put
        assert!(after[2].distance_to(&pointer) < 1e-9);
        assert!(after[0].distance_to(&before[0]) < 1e-9);
        let bounds = shape.bounds();
        assert!((bounds.width - 110.0).abs() < 1e-9);
        assert!((bounds.height - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_drawn_bounds_minimum() {
        assert_eq!(
            drawn_bounds(Point::new(110.0, 60.0), Point::new(10.0, 10.0)),
            Some(Rect::new(10.0, 10.0, 100.0, 50.0))
        );
        assert_eq!(drawn_bounds(Point::new(0.0, 0.0), Point::new(0.0, 0.0)), None);
    }
}
