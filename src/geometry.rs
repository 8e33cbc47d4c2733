//! Geometry kernel for the annotation editor.
//!
//! Pure functions and small value types: points, axis-aligned rectangles,
//! convexity testing, nearest-vertex/nearest-corner search and rotation
//! about a pivot. Everything here works in scene (image-pixel) coordinates
//! and holds no state.

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// This point shifted by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// One of the four corners of a [`Rect`].
///
/// The declaration order is the evaluation order used by [`nearest_corner`],
/// which is also its tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

impl Corner {
    /// All corners in evaluation order.
    pub const ALL: [Corner; 4] = [
        Corner::BottomLeft,
        Corner::BottomRight,
        Corner::TopLeft,
        Corner::TopRight,
    ];
}

/// An axis-aligned rectangle. Y grows downwards, so "top" is the minimum y.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner X coordinate
    pub x: f64,
    /// Top-left corner Y coordinate
    pub y: f64,
    /// Width of the rectangle
    pub width: f64,
    /// Height of the rectangle
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a normalized rectangle from two opposite corners in any order.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let x = p1.x.min(p2.x);
        let y = p1.y.min(p2.y);
        let width = (p1.x - p2.x).abs();
        let height = (p1.y - p2.y).abs();
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left(), self.top())
    }

    /// Position of the given corner.
    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::BottomLeft => Point::new(self.left(), self.bottom()),
            Corner::BottomRight => Point::new(self.right(), self.bottom()),
            Corner::TopLeft => Point::new(self.left(), self.top()),
            Corner::TopRight => Point::new(self.right(), self.top()),
        }
    }

    /// Get the center point of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Move one corner to `point`, keeping the other edges fixed.
    ///
    /// The result is not normalized: dragging a corner past the opposite
    /// edge yields a negative width or height, which callers treat as an
    /// invalid edit.
    pub fn with_corner(&self, corner: Corner, point: Point) -> Rect {
        let (mut left, mut top, mut right, mut bottom) =
            (self.left(), self.top(), self.right(), self.bottom());
        match corner {
            Corner::BottomLeft => {
                left = point.x;
                bottom = point.y;
            }
            Corner::BottomRight => {
                right = point.x;
                bottom = point.y;
            }
            Corner::TopLeft => {
                left = point.x;
                top = point.y;
            }
            Corner::TopRight => {
                right = point.x;
                top = point.y;
            }
        }
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Check if a point is inside the rectangle (edges inclusive).
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Check whether two rectangles overlap (touching edges count).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    /// This rectangle shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

// ============================================================================
// Kernel Functions
// ============================================================================

/// Signed length of the cross product BA x BC, taken at vertex `b`.
///
/// The sign encodes the turn direction at `b`; zero means the three points
/// are collinear.
pub fn cross_product_length(a: Point, b: Point, c: Point) -> f64 {
    let ba_x = a.x - b.x;
    let ba_y = a.y - b.y;
    let bc_x = c.x - b.x;
    let bc_y = c.y - b.y;

    ba_x * bc_y - ba_y * bc_x
}

/// Check whether a closed polygon is convex.
///
/// Walks every wrapping triple of consecutive vertices and fails as soon as
/// both a strictly negative and a strictly positive turn have been seen.
/// Collinear triples never flip the result. Polygons with fewer than three
/// vertices have no turns to violate and are reported convex.
pub fn is_convex(vertices: &[Point]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return true;
    }

    let mut got_negative = false;
    let mut got_positive = false;

    for a in 0..n {
        let b = (a + 1) % n;
        let c = (b + 1) % n;

        let cross = cross_product_length(vertices[a], vertices[b], vertices[c]);
        if cross < 0.0 {
            got_negative = true;
        } else if cross > 0.0 {
            got_positive = true;
        }

        if got_negative && got_positive {
            return false;
        }
    }

    true
}

/// Index of the vertex nearest to `point`.
///
/// Ties go to the lowest index. Returns `None` for an empty slice.
pub fn nearest_vertex_index(vertices: &[Point], point: Point) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, vertex) in vertices.iter().enumerate() {
        let dist = vertex.distance_to(&point);
        match best {
            Some((_, min)) if dist >= min => {}
            _ => best = Some((i, dist)),
        }
    }

    best.map(|(i, _)| i)
}

/// The corner of `rect` nearest to `point`.
///
/// Corners are evaluated bottom-left, bottom-right, top-left, top-right and
/// a later corner only wins when it is strictly closer, so the earlier corner
/// in that order wins ties.
pub fn nearest_corner(rect: &Rect, point: Point) -> Corner {
    let mut best = Corner::BottomLeft;
    let mut min = rect.corner(best).distance_to(&point);

    for corner in &Corner::ALL[1..] {
        let dist = rect.corner(*corner).distance_to(&point);
        if dist < min {
            min = dist;
            best = *corner;
        }
    }

    best
}

/// Absolute rotation angle, in degrees, of the ray from `pivot` to `pointer`.
pub fn rotation_angle(pivot: Point, pointer: Point) -> f64 {
    let dx = pointer.x - pivot.x;
    let dy = pointer.y - pivot.y;
    dy.atan2(dx).to_degrees()
}

/// Rotate `point` about `pivot` by `degrees` (clockwise on screen, since y
/// grows downwards).
pub fn rotate_about(point: Point, pivot: Point, degrees: f64) -> Point {
    if degrees == 0.0 {
        return point;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = point.x - pivot.x;
    let dy = point.y - pivot.y;
    Point::new(
        pivot.x + dx * cos - dy * sin,
        pivot.y + dx * sin + dy * cos,
    )
}

/// Bounding rectangle of a set of points, or `None` if empty.
pub fn bounding_rect(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;

    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x;
    let mut max_y = first.y;

    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Point-in-polygon test using ray casting.
pub fn polygon_contains(vertices: &[Point], point: Point) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Shortest distance from `point` to the segment `a`-`b`.
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return point.distance_to(&a);
    }
    let t = (((point.x - a.x) * abx + (point.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    point.distance_to(&Point::new(a.x + t * abx, a.y + t * aby))
}

// ============================================================================
// Tests
// ============================================================================
