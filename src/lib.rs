//! ROI Annotator - region-of-interest annotation core
//!
//! The editing engine behind an image annotation tool: users draw and edit
//! rectangles, trapezoids, free polygons and lines over an image, label them
//! with a class, and store them as JSON for later use (e.g. as training
//! labels). Windowing and rendering live outside this crate; a UI feeds
//! pointer and key events into a [`Session`] and draws
//! [`Session::visible_shapes`].

pub mod catalog;
pub mod config;
pub mod constants;
pub mod format;
pub mod geometry;
pub mod keybindings;
pub mod model;
pub mod persist;
pub mod scene;
pub mod session;

pub use config::{AppConfig, LogLevel};
pub use model::{AnnotationSet, Geometry, Shape, ShapeId, ShapeKind};
pub use scene::{EditingMode, Key, KeyEvent, PointerEvent, Scene};
pub use session::{Session, SessionError};
