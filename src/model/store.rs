//! Annotation storage for the shapes of one open image.

use std::fmt;

use crate::geometry::{Point, Rect};
use crate::model::shape::Shape;

/// Opaque handle to a shape in an [`AnnotationSet`].
///
/// Returned by [`AnnotationSet::add`]; callers keep it to edit or remove the
/// shape later. Handles are never reused within a set, even after `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stored shape together with its handle and selection flag.
#[derive(Debug, Clone)]
pub struct Annotation {
    id: ShapeId,
    shape: Shape,
    selected: bool,
}

impl Annotation {
    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// Ordered collection of shapes; insertion order is draw order.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    annotations: Vec<Annotation>,
    next_id: u64,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from shapes, preserving their order.
    pub fn from_shapes(shapes: impl IntoIterator<Item = Shape>) -> Self {
        let mut set = Self::new();
        for shape in shapes {
            set.add(shape);
        }
        set
    }

    /// Append a shape on top of the draw order and return its handle.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        log::trace!("Store: add {} {} '{}'", id, shape.kind(), shape.class_name);
        self.annotations.push(Annotation {
            id,
            shape,
            selected: false,
        });
        id
    }

    /// Remove a shape by handle.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.index_of(id)?;
        let removed = self.annotations.remove(index);
        log::trace!("Store: removed {}", id);
        Some(removed.shape)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.annotations
            .iter()
            .find(|a| a.id == id)
            .map(|a| &a.shape)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.annotations
            .iter_mut()
            .find(|a| a.id == id)
            .map(|a| &mut a.shape)
    }

    /// All annotations in draw order.
    pub fn all(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// All shapes in draw order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.annotations.iter().map(|a| &a.shape)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Remove every shape.
    pub fn clear(&mut self) {
        if !self.annotations.is_empty() {
            log::debug!("Store: cleared {} shapes", self.annotations.len());
        }
        self.annotations.clear();
    }

    fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.annotations.iter().position(|a| a.id == id)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Set the selection flag of one shape. Returns false if the id is unknown.
    pub fn set_selected(&mut self, id: ShapeId, selected: bool) -> bool {
        match self.annotations.iter_mut().find(|a| a.id == id) {
            Some(annotation) => {
                annotation.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Select exactly one shape, deselecting all others.
    pub fn select_only(&mut self, id: ShapeId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        for annotation in &mut self.annotations {
            annotation.selected = annotation.id == id;
        }
        true
    }

    pub fn clear_selection(&mut self) {
        for annotation in &mut self.annotations {
            annotation.selected = false;
        }
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.annotations.iter().any(|a| a.id == id && a.selected)
    }

    /// Handles of the selected shapes, in draw order.
    pub fn selected_ids(&self) -> Vec<ShapeId> {
        self.annotations
            .iter()
            .filter(|a| a.selected)
            .map(|a| a.id)
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.annotations.iter().filter(|a| a.selected).count()
    }

    /// The selected shape, if exactly one is selected.
    pub fn single_selected(&self) -> Option<ShapeId> {
        let mut selected = self.annotations.iter().filter(|a| a.selected);
        match (selected.next(), selected.next()) {
            (Some(only), None) => Some(only.id),
            _ => None,
        }
    }

    /// Remove every selected shape and return them in draw order.
    pub fn remove_selected(&mut self) -> Vec<Shape> {
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.annotations.drain(..).partition(|a| a.selected);
        self.annotations = kept;
        removed.into_iter().map(|a| a.shape).collect()
    }

    // ========================================================================
    // Hit Testing
    // ========================================================================

    /// Topmost shape under `point` (the most recently drawn one wins).
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.annotations
            .iter()
            .rev()
            .find(|a| a.shape.contains_point(point, tolerance))
            .map(|a| a.id)
    }

    /// Every shape whose on-scene bounds intersect `area`, in draw order.
    pub fn intersecting(&self, area: &Rect) -> Vec<ShapeId> {
        self.annotations
            .iter()
            .filter(|a| a.shape.scene_bounds().intersects(area))
            .map(|a| a.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(class: &str, x: f64, y: f64, size: f64) -> Shape {
        Shape::rectangle(class, Rect::new(x, y, size, size))
    }

    #[test]
    fn test_add_remove_keeps_draw_order() {
        let mut set = AnnotationSet::new();
        let a = set.add(square("a", 0.0, 0.0, 10.0));
        let b = set.add(square("b", 5.0, 5.0, 10.0));
        let c = set.add(square("c", 50.0, 50.0, 10.0));
        assert_eq!(set.len(), 3);

        assert_eq!(set.remove(b).map(|s| s.class_name), Some("b".to_string()));
        assert!(set.remove(b).is_none());

        let order: Vec<ShapeId> = set.all().map(|a| a.id()).collect();
        assert_eq!(order, vec![a, c]);
    }

    #[test]
    fn test_duplicate_geometry_gets_distinct_handles() {
        let mut set = AnnotationSet::new();
        let first = set.add(square("Car", 0.0, 0.0, 10.0));
        let second = set.add(square("Car", 0.0, 0.0, 10.0));
        assert_ne!(first, second);

        set.remove(first);
        assert_eq!(set.len(), 1);
        assert!(set.get(second).is_some());
    }

    #[test]
    fn test_handles_are_not_reused_after_clear() {
        let mut set = AnnotationSet::new();
        let old = set.add(square("", 0.0, 0.0, 10.0));
        set.clear();
        assert!(set.is_empty());
        let new = set.add(square("", 0.0, 0.0, 10.0));
        assert_ne!(old, new);
        assert!(set.get(old).is_none());
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut set = AnnotationSet::new();
        let bottom = set.add(square("", 0.0, 0.0, 20.0));
        let top = set.add(square("", 10.0, 10.0, 20.0));

        assert_eq!(set.hit_test(Point::new(15.0, 15.0), 0.0), Some(top));
        assert_eq!(set.hit_test(Point::new(5.0, 5.0), 0.0), Some(bottom));
        assert_eq!(set.hit_test(Point::new(100.0, 100.0), 0.0), None);
    }

    #[test]
    fn test_selection_helpers() {
        let mut set = AnnotationSet::new();
        let a = set.add(square("", 0.0, 0.0, 10.0));
        let b = set.add(square("", 20.0, 0.0, 10.0));

        assert!(set.select_only(a));
        assert_eq!(set.single_selected(), Some(a));

        set.set_selected(b, true);
        assert_eq!(set.selected_ids(), vec![a, b]);
        assert_eq!(set.single_selected(), None);

        let removed = set.remove_selected();
        assert_eq!(removed.len(), 2);
        assert!(set.is_empty());
    }

    #[test]
    fn test_intersecting_area() {
        let mut set = AnnotationSet::new();
        let a = set.add(square("", 0.0, 0.0, 10.0));
        let _far = set.add(square("", 100.0, 100.0, 10.0));
        let c = set.add(square("", 8.0, 8.0, 10.0));

        assert_eq!(set.intersecting(&Rect::new(-5.0, -5.0, 20.0, 20.0)), vec![a, c]);
    }
}
