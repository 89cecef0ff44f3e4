//! WebAssembly bindings for design-core.
//!
//! Values cross the boundary as JSON strings. Change notifications are queued
//! and collected by the host with [`WasmEditor::drain_events`], typically once
//! per animation frame.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::{
    Anchor, Editor, EditorConfig, EditorEvent, ElementId, ElementPatch, ElementVariant, InputEvent,
    Instant, KeyModifiers, Point, Size, TransformDelta,
};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
    pending: Rc<RefCell<Vec<EditorEvent>>>,
}

fn parse_id(id: &str) -> Result<ElementId, String> {
    ElementId::parse(id).map_err(|e| format!("invalid element id {id:?}: {e}"))
}

fn parse_variant(variant: &str) -> Result<ElementVariant, String> {
    serde_json::from_value(serde_json::Value::String(variant.to_string()))
        .map_err(|_| format!("unknown element variant {variant:?}"))
}

fn parse_patch(json: &str) -> Result<ElementPatch, String> {
    if json.trim().is_empty() {
        return Ok(ElementPatch::default());
    }
    serde_json::from_str(json).map_err(|e| e.to_string())
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor with default settings.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Create an editor from a JSON config object.
    ///
    /// # Errors
    ///
    /// Returns an error string if the config cannot be parsed.
    #[wasm_bindgen(js_name = withConfigJson)]
    pub fn with_config_json(json: &str) -> Result<WasmEditor, String> {
        let config = EditorConfig::from_json(json).map_err(|e| e.to_string())?;
        Ok(Self::with_config(config))
    }

    /// Load a serialized scene. Returns the skipped elements as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the scene is malformed; the current scene is kept.
    #[wasm_bindgen(js_name = loadScene)]
    pub fn load_scene(&mut self, json: &str) -> Result<String, String> {
        let skipped = self.editor.load_scene(json).map_err(|e| e.to_string())?;
        serde_json::to_string(&skipped).map_err(|e| e.to_string())
    }

    /// Serialize the current scene.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = serializeScene)]
    pub fn serialize_scene(&self) -> Result<String, String> {
        self.editor.serialize_scene().map_err(|e| e.to_string())
    }

    /// Add an element. `overrides` is an optional JSON patch. Returns the new ID.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown variant or invalid overrides.
    #[wasm_bindgen(js_name = addElement)]
    pub fn add_element(
        &mut self,
        variant: &str,
        x: f32,
        y: f32,
        width: Option<f32>,
        height: Option<f32>,
        overrides: &str,
    ) -> Result<String, String> {
        let variant = parse_variant(variant)?;
        let overrides = parse_patch(overrides)?;
        let size = width.zip(height).map(|(w, h)| Size::new(w, h));
        let id = self
            .editor
            .add_element(variant, Point::new(x, y), size, &overrides);
        Ok(id.to_string())
    }

    /// Merge a JSON patch into an element.
    ///
    /// # Errors
    ///
    /// Returns an error string for an invalid ID or patch.
    #[wasm_bindgen(js_name = updateElement)]
    pub fn update_element(&mut self, id: &str, patch: &str) -> Result<bool, String> {
        let id = parse_id(id)?;
        let patch = parse_patch(patch)?;
        Ok(self.editor.update_element(id, &patch))
    }

    /// Delete the selected elements. Returns how many were deleted.
    #[wasm_bindgen(js_name = deleteSelected)]
    #[allow(clippy::cast_possible_truncation)]
    pub fn delete_selected(&mut self) -> u32 {
        self.editor.delete_selected() as u32
    }

    /// Duplicate an element. Returns the copy's ID.
    ///
    /// # Errors
    ///
    /// Returns an error string for an invalid ID.
    pub fn duplicate(&mut self, id: &str) -> Result<Option<String>, String> {
        let id = parse_id(id)?;
        Ok(self.editor.duplicate(id).map(|copy| copy.to_string()))
    }

    /// Select a single element.
    ///
    /// # Errors
    ///
    /// Returns an error string for an invalid ID.
    pub fn select(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.editor.select(parse_id(id)?))
    }

    /// Select every element.
    #[wasm_bindgen(js_name = selectAll)]
    pub fn select_all(&mut self) -> bool {
        self.editor.select_all()
    }

    /// Clear the selection.
    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) -> bool {
        self.editor.clear_selection()
    }

    /// Selected IDs as a JSON array.
    #[wasm_bindgen(js_name = selectionJson)]
    #[must_use]
    pub fn selection_json(&self) -> String {
        serde_json::to_string(self.editor.selection().ids()).unwrap_or_default()
    }

    /// Bounding box of the selection as JSON, or `null`.
    #[wasm_bindgen(js_name = selectionBoundsJson)]
    #[must_use]
    pub fn selection_bounds_json(&self) -> String {
        serde_json::to_string(&self.editor.selection_bounds()).unwrap_or_default()
    }

    /// Primary button pressed.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32, shift: bool) -> bool {
        self.editor.handle_input(&InputEvent::PointerDown {
            x,
            y,
            modifiers: KeyModifiers {
                shift,
                ..KeyModifiers::default()
            },
        })
    }

    /// Pointer moved.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.editor.handle_input(&InputEvent::PointerMove { x, y })
    }

    /// Primary button released.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.editor.handle_input(&InputEvent::PointerUp { x, y })
    }

    /// Route an [`InputEvent`] given as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the event cannot be parsed.
    #[wasm_bindgen(js_name = handleInputJson)]
    pub fn handle_input_json(&mut self, json: &str) -> Result<bool, String> {
        let event: InputEvent = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(self.editor.handle_input(&event))
    }

    /// Cancel a marquee left open past the configured timeout.
    #[wasm_bindgen(js_name = expireGestures)]
    pub fn expire_gestures(&mut self) -> bool {
        self.editor.expire_gestures(Instant::now())
    }

    /// Start a resize/rotate gesture.
    ///
    /// # Errors
    ///
    /// Returns an error string for an invalid ID.
    #[wasm_bindgen(js_name = beginTransform)]
    pub fn begin_transform(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.editor.begin_transform(parse_id(id)?).is_some())
    }

    /// Finish the resize/rotate gesture with the node's final state.
    #[wasm_bindgen(js_name = endTransform)]
    pub fn end_transform(
        &mut self,
        x: f32,
        y: f32,
        rotation: f32,
        scale_x: f32,
        scale_y: f32,
        anchor: Option<String>,
    ) -> bool {
        let delta = TransformDelta {
            x,
            y,
            rotation,
            scale_x,
            scale_y,
            anchor: anchor.as_deref().and_then(Anchor::from_name),
        };
        self.editor.end_transform(&delta).is_some()
    }

    /// Abandon the gesture in progress.
    #[wasm_bindgen(js_name = cancelGesture)]
    pub fn cancel_gesture(&mut self) -> bool {
        self.editor.cancel_gesture()
    }

    /// Swap an element with the one above it.
    ///
    /// # Errors
    ///
    /// Returns an error string for an invalid ID.
    #[wasm_bindgen(js_name = bringForward)]
    pub fn bring_forward(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.editor.bring_forward(parse_id(id)?))
    }

    /// Swap an element with the one below it.
    ///
    /// # Errors
    ///
    /// Returns an error string for an invalid ID.
    #[wasm_bindgen(js_name = sendBackward)]
    pub fn send_backward(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.editor.send_backward(parse_id(id)?))
    }

    /// Move an element to the top.
    ///
    /// # Errors
    ///
    /// Returns an error string for an invalid ID.
    #[wasm_bindgen(js_name = bringToFront)]
    pub fn bring_to_front(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.editor.bring_to_front(parse_id(id)?))
    }

    /// Move an element to the bottom.
    ///
    /// # Errors
    ///
    /// Returns an error string for an invalid ID.
    #[wasm_bindgen(js_name = sendToBack)]
    pub fn send_to_back(&mut self, id: &str) -> Result<bool, String> {
        Ok(self.editor.send_to_back(parse_id(id)?))
    }

    /// Undo the last commit.
    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    /// Redo the next commit.
    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// DPI reports for every image as a JSON array of `[id, report]` pairs.
    #[wasm_bindgen(js_name = analyzeImagesJson)]
    #[must_use]
    pub fn analyze_images_json(&self) -> String {
        serde_json::to_string(&self.editor.analyze_images()).unwrap_or_default()
    }

    /// Take every queued change notification as a JSON array.
    #[wasm_bindgen(js_name = drainEvents)]
    #[must_use]
    pub fn drain_events(&self) -> String {
        let events = std::mem::take(&mut *self.pending.borrow_mut());
        serde_json::to_string(&events).unwrap_or_default()
    }
}

impl WasmEditor {
    fn with_config(config: EditorConfig) -> Self {
        let mut editor = Editor::new(config);
        let pending = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pending);
        editor.on_change(move |event, _| sink.borrow_mut().push(event.clone()));
        Self { editor, pending }
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_element_returns_parseable_id() {
        let mut editor = WasmEditor::new();
        let id = editor
            .add_element("rect", 10.0, 10.0, Some(40.0), Some(20.0), "")
            .expect("add");
        assert!(ElementId::parse(&id).is_ok());
        assert!(editor.can_undo());
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let mut editor = WasmEditor::new();
        assert!(editor
            .add_element("hexagram", 0.0, 0.0, None, None, "")
            .is_err());
    }

    #[test]
    fn events_are_queued_until_drained() {
        let mut editor = WasmEditor::new();
        editor
            .add_element("circle", 0.0, 0.0, None, None, r##"{"fill":"#ff0000"}"##)
            .expect("add");
        let events: serde_json::Value =
            serde_json::from_str(&editor.drain_events()).expect("json");
        assert_eq!(events[0]["event"], "scene_changed");
        assert_eq!(editor.drain_events(), "[]");
    }

    #[test]
    fn load_scene_rejects_garbage_and_keeps_scene() {
        let mut editor = WasmEditor::new();
        editor
            .add_element("text", 0.0, 0.0, None, None, "")
            .expect("add");
        let before = editor.serialize_scene().expect("serialize");
        assert!(editor.load_scene("{ not valid json }").is_err());
        assert_eq!(editor.serialize_scene().expect("serialize"), before);
    }

    #[test]
    fn scene_json_roundtrip() {
        let mut first = WasmEditor::new();
        first
            .add_element("star", 5.0, 5.0, Some(60.0), Some(60.0), "")
            .expect("add");
        let json = first.serialize_scene().expect("serialize");

        let mut second = WasmEditor::new();
        second.load_scene(&json).expect("load");
        assert_eq!(second.serialize_scene().expect("serialize"), json);
    }

    #[test]
    fn transform_from_js_arguments() {
        let mut editor = WasmEditor::new();
        let id = editor
            .add_element("rect", 0.0, 0.0, Some(50.0), Some(50.0), "")
            .expect("add");
        assert!(editor.begin_transform(&id).expect("begin"));
        assert!(editor.end_transform(0.0, 0.0, 45.0, 2.0, 2.0, Some("bottom-right".to_string())));
        assert!(!editor.end_transform(0.0, 0.0, 0.0, 1.0, 1.0, None));
    }
}
