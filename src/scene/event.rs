//! Input events consumed by the scene.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    /// Primary button pressed.
    Down,
    /// Pointer moved (button held or not).
    Move,
    /// Primary button released.
    Up,
}

/// A pointer event in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: Point,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Down,
            position: Point::new(x, y),
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Move,
            position: Point::new(x, y),
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Up,
            position: Point::new(x, y),
        }
    }
}

/// Keyboard keys (simplified set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Control,
    Shift,
    Alt,
    Delete,
    Backspace,
    Escape,
    Enter,
}

/// A key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub pressed: bool,
}

impl KeyEvent {
    pub fn pressed(key: Key) -> Self {
        Self { key, pressed: true }
    }

    pub fn released(key: Key) -> Self {
        Self {
            key,
            pressed: false,
        }
    }
}
