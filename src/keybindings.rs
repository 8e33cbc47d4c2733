//! Customizable keybindings for the annotation tools.
//!
//! Tool hotkeys switch the toolbar mode. The edit modifier and delete key are
//! handed to the scene through [`SceneSettings`].

use crate::scene::{EditingMode, Key, SceneSettings};

/// Keybinding configuration for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    /// Hotkey for the Select tool
    pub tool_select: Key,
    /// Hotkey for the Line tool
    pub tool_line: Key,
    /// Hotkey for the Rectangle tool
    pub tool_rectangle: Key,
    /// Hotkey for the Trapezoid tool
    pub tool_trapezoid: Key,
    /// Hotkey for the Polygon tool
    pub tool_polygon: Key,
    /// Hotkey for the Rotate tool
    pub tool_rotate: Key,

    /// Held to resize (or rotate) the single selected shape
    pub edit_modifier: Key,
    /// Removes the selected shapes
    pub delete: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            tool_select: Key::Char('s'),
            tool_line: Key::Char('l'),
            tool_rectangle: Key::Char('r'),
            tool_trapezoid: Key::Char('t'),
            tool_polygon: Key::Char('p'),
            tool_rotate: Key::Char('o'),

            edit_modifier: Key::Control,
            delete: Key::Delete,
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the toolbar mode that corresponds to a key press, if any.
    ///
    /// Letter keys match case-insensitively.
    pub fn mode_for_key(&self, key: Key) -> Option<EditingMode> {
        let key = normalize(key);
        EditingMode::toolbar()
            .iter()
            .copied()
            .find(|mode| self.key_for_mode(*mode).map(normalize) == Some(key))
    }

    /// Get the hotkey for a toolbar mode.
    pub fn key_for_mode(&self, mode: EditingMode) -> Option<Key> {
        match mode {
            EditingMode::Selecting => Some(self.tool_select),
            EditingMode::DrawingLine => Some(self.tool_line),
            EditingMode::DrawingRectangle => Some(self.tool_rectangle),
            EditingMode::DrawingTrapezoid => Some(self.tool_trapezoid),
            EditingMode::DrawingPolygon => Some(self.tool_polygon),
            EditingMode::Rotating => Some(self.tool_rotate),
            EditingMode::Idle | EditingMode::Editing => None,
        }
    }

    /// Set the hotkey for a toolbar mode. Returns false for modes without one.
    pub fn set_mode_key(&mut self, mode: EditingMode, key: Key) -> bool {
        let slot = match mode {
            EditingMode::Selecting => &mut self.tool_select,
            EditingMode::DrawingLine => &mut self.tool_line,
            EditingMode::DrawingRectangle => &mut self.tool_rectangle,
            EditingMode::DrawingTrapezoid => &mut self.tool_trapezoid,
            EditingMode::DrawingPolygon => &mut self.tool_polygon,
            EditingMode::Rotating => &mut self.tool_rotate,
            EditingMode::Idle | EditingMode::Editing => return false,
        };
        *slot = key;
        true
    }

    /// Check if a key is already used by any binding.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, key: Key, exclude_mode: Option<EditingMode>) -> Option<String> {
        if let Some(mode) = self.mode_for_key(key) {
            if Some(mode) != exclude_mode {
                return Some(format!("{} tool", mode.name()));
            }
        }
        if key == self.edit_modifier {
            return Some("Edit modifier".to_string());
        }
        if key == self.delete {
            return Some("Delete".to_string());
        }
        None
    }

    /// Describe every key that is bound to more than one action.
    pub fn conflicts(&self) -> Vec<String> {
        let mut found = Vec::new();
        for mode in EditingMode::toolbar() {
            let Some(key) = self.key_for_mode(*mode) else {
                continue;
            };
            if let Some(other) = self.key_conflict(key, Some(*mode)) {
                found.push(format!(
                    "{} is bound to both the {} tool and {}",
                    key_to_string(key),
                    mode.name(),
                    other
                ));
            }
        }
        if self.edit_modifier == self.delete {
            found.push(format!(
                "{} is bound to both Edit modifier and Delete",
                key_to_string(self.delete)
            ));
        }
        found
    }

    /// Scene settings using these bindings.
    pub fn scene_settings(&self, hit_tolerance: f64) -> SceneSettings {
        SceneSettings {
            edit_modifier: self.edit_modifier,
            delete_key: self.delete,
            hit_tolerance,
        }
    }
}

fn normalize(key: Key) -> Key {
    match key {
        Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Convert a key to a display string.
pub fn key_to_string(key: Key) -> String {
    match key {
        Key::Char(' ') => "Space".to_string(),
        Key::Char(c) => c.to_ascii_uppercase().to_string(),
        Key::Control => "Ctrl".to_string(),
        Key::Shift => "Shift".to_string(),
        Key::Alt => "Alt".to_string(),
        Key::Delete => "Del".to_string(),
        Key::Backspace => "Backspace".to_string(),
        Key::Escape => "Esc".to_string(),
        Key::Enter => "Enter".to_string(),
    }
}
