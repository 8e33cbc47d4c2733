//! Global constants for the annotation editor

/// Minimum width/height (scene units) of a rectangle or trapezoid.
/// Gestures and edits producing anything smaller are ignored.
pub const MIN_SHAPE_SIZE: f64 = 3.0;

/// Minimum number of vertices for a polygon to be committed.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// The top edge of a freshly drawn trapezoid is inset by width / this value
/// on each side.
pub const TRAPEZOID_INSET_DIVISOR: f64 = 6.0;

/// Default hit tolerance (scene units) for selecting thin shapes like lines.
pub const DEFAULT_HIT_TOLERANCE: f64 = 4.0;

/// Name of the application directory under the user config directory.
pub const APP_DIR_NAME: &str = "roi-annotator";
