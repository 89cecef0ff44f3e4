//! Input events consumed by the editor and change events it emits.

use serde::{Deserialize, Serialize};

use crate::element::{ElementId, Point};
use crate::scene::Scene;

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    #[serde(default)]
    pub shift: bool,
    /// Control key pressed.
    #[serde(default)]
    pub ctrl: bool,
    /// Alt/Option key pressed.
    #[serde(default)]
    pub alt: bool,
    /// Meta/Command key pressed.
    #[serde(default)]
    pub meta: bool,
}

impl KeyModifiers {
    /// Control on most platforms, Command on macOS.
    #[must_use]
    pub const fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown {
        /// X coordinate in scene space.
        x: f32,
        /// Y coordinate in scene space.
        y: f32,
        /// Active modifier keys.
        #[serde(default)]
        modifiers: KeyModifiers,
    },
    /// Pointer moved.
    PointerMove {
        /// X coordinate in scene space.
        x: f32,
        /// Y coordinate in scene space.
        y: f32,
    },
    /// Primary button released.
    PointerUp {
        /// X coordinate in scene space.
        x: f32,
        /// Y coordinate in scene space.
        y: f32,
    },
    /// The input layer lost the pointer (window blur, touch cancel).
    PointerCancel,
    /// Key pressed.
    Key {
        /// Key name, e.g. `"Delete"` or `"z"`.
        key: String,
        /// Active modifier keys.
        #[serde(default)]
        modifiers: KeyModifiers,
    },
}

impl InputEvent {
    /// Pointer position, for pointer events.
    #[must_use]
    pub const fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Some(Point::new(*x, *y))
            }
            Self::PointerCancel | Self::Key { .. } => None,
        }
    }
}

/// Keyboard commands understood by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Delete the selection.
    Delete,
    /// Undo.
    Undo,
    /// Redo.
    Redo,
    /// Duplicate the primary selection.
    Duplicate,
    /// Select every element.
    SelectAll,
    /// Drop the selection and any open gesture.
    Escape,
}

impl KeyCommand {
    /// Map a key press to a command.
    #[must_use]
    pub fn from_key(key: &str, modifiers: KeyModifiers) -> Option<Self> {
        let command = modifiers.command();
        match key {
            "Delete" | "Backspace" => Some(Self::Delete),
            "Escape" => Some(Self::Escape),
            "z" | "Z" if command && modifiers.shift => Some(Self::Redo),
            "z" | "Z" if command => Some(Self::Undo),
            "y" | "Y" if command => Some(Self::Redo),
            "d" | "D" if command => Some(Self::Duplicate),
            "a" | "A" if command => Some(Self::SelectAll),
            _ => None,
        }
    }
}

/// Why the scene changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    /// A new scene was loaded.
    Loaded,
    /// An element was added.
    Added,
    /// Element properties were edited.
    Updated,
    /// One or more elements were deleted.
    Deleted,
    /// An element was moved.
    Moved,
    /// An element was resized or rotated.
    Transformed,
    /// An element was duplicated.
    Duplicated,
    /// The stacking order changed.
    Reordered,
    /// History stepped back.
    Undo,
    /// History stepped forward.
    Redo,
    /// The background color changed.
    Background,
}

/// Notifications emitted by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    /// The scene was modified.
    SceneChanged {
        /// What caused the change.
        reason: ChangeReason,
    },
    /// The selection changed.
    SelectionChanged {
        /// Selected IDs, in selection order.
        ids: Vec<ElementId>,
    },
}

/// Callback invoked for every [`EditorEvent`] with the scene as it is after the change.
pub type ChangeListener = Box<dyn FnMut(&EditorEvent, &Scene)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_commands() {
        let none = KeyModifiers::default();
        let ctrl = KeyModifiers {
            ctrl: true,
            ..KeyModifiers::default()
        };
        let ctrl_shift = KeyModifiers {
            shift: true,
            ..ctrl
        };
        let meta = KeyModifiers {
            meta: true,
            ..KeyModifiers::default()
        };

        assert_eq!(KeyCommand::from_key("Delete", none), Some(KeyCommand::Delete));
        assert_eq!(KeyCommand::from_key("z", ctrl), Some(KeyCommand::Undo));
        assert_eq!(KeyCommand::from_key("z", meta), Some(KeyCommand::Undo));
        assert_eq!(KeyCommand::from_key("Z", ctrl_shift), Some(KeyCommand::Redo));
        assert_eq!(KeyCommand::from_key("y", ctrl), Some(KeyCommand::Redo));
        assert_eq!(KeyCommand::from_key("d", ctrl), Some(KeyCommand::Duplicate));
        assert_eq!(KeyCommand::from_key("z", none), None);
    }

    #[test]
    fn test_input_event_serialization() {
        let event = InputEvent::PointerDown {
            x: 10.0,
            y: 20.0,
            modifiers: KeyModifiers::default(),
        };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"type\":\"pointer_down\""));

        let parsed: InputEvent =
            serde_json::from_str(r#"{"type":"pointer_up","data":{"x":1,"y":2}}"#).expect("parse");
        assert_eq!(parsed.position(), Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_editor_event_serialization() {
        let event = EditorEvent::SceneChanged {
            reason: ChangeReason::Reordered,
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["event"], "scene_changed");
        assert_eq!(value["reason"], "reordered");
    }
}
