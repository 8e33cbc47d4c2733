//! Editing modes of the scene.

use serde::{Deserialize, Serialize};

/// What pointer input currently does. Exactly one mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EditingMode {
    /// Nothing happens on pointer input.
    #[default]
    Idle,
    /// Select, move and rubber-band select shapes.
    Selecting,
    /// Drag out a line.
    DrawingLine,
    /// Drag out a rectangle.
    DrawingRectangle,
    /// Drag out the bounds of a trapezoid.
    DrawingTrapezoid,
    /// Click to append polygon vertices.
    DrawingPolygon,
    /// Resize the single selected shape with the pointer.
    Editing,
    /// Rotate the selected shapes towards the pointer.
    Rotating,
}

impl EditingMode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            EditingMode::Idle => "Idle",
            EditingMode::Selecting => "Select",
            EditingMode::DrawingLine => "Line",
            EditingMode::DrawingRectangle => "Rectangle",
            EditingMode::DrawingTrapezoid => "Trapezoid",
            EditingMode::DrawingPolygon => "Polygon",
            EditingMode::Editing => "Edit",
            EditingMode::Rotating => "Rotate",
        }
    }

    /// Modes a toolbar can switch to.
    pub fn toolbar() -> &'static [EditingMode] {
        &[
            EditingMode::Selecting,
            EditingMode::DrawingLine,
            EditingMode::DrawingRectangle,
            EditingMode::DrawingTrapezoid,
            EditingMode::DrawingPolygon,
            EditingMode::Rotating,
        ]
    }

    /// Check if this mode creates new shapes.
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            EditingMode::DrawingLine
                | EditingMode::DrawingRectangle
                | EditingMode::DrawingTrapezoid
                | EditingMode::DrawingPolygon
        )
    }
}
