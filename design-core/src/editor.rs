//! The editing session.
//!
//! [`Editor`] owns the scene, the undo history, the gesture in progress and the
//! change listeners. Every operation runs to completion synchronously. Operations
//! that name an element missing from the scene are logged and ignored.

use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::element::{Element, ElementId, ElementPatch, ElementVariant, Point, Size};
use crate::error::{EngineError, EngineResult};
use crate::event::{ChangeListener, ChangeReason, EditorEvent, InputEvent, KeyCommand, KeyModifiers};
use crate::geometry::{union_bounds, Bounds};
use crate::gesture::{Gesture, GestureToken, Instant};
use crate::history::History;
use crate::layering::{reorder, LayerMove};
use crate::print_quality::{analyze_image, DpiReport};
use crate::scene::Scene;
use crate::schema::{parse_scene, SceneDocument, SkippedElement};
use crate::selection::{resolve_marquee, Marquee, MarqueeOutcome, Selection};
use crate::surface::{RasterFormat, RasterSurface};
use crate::transform::{resolve_transform, FieldUpdates, TransformDelta};

/// An editing session over a single scene.
pub struct Editor {
    scene: Scene,
    history: History,
    gesture: Gesture,
    config: EditorConfig,
    listeners: Vec<ChangeListener>,
    last_token: Option<GestureToken>,
    /// Pointer offset from the dragged element's origin.
    grab_offset: Point,
}

impl Editor {
    /// Start a session over an empty default canvas.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self::with_scene(Scene::default(), config)
    }

    /// Start a session over an existing scene. The scene becomes the first history entry.
    #[must_use]
    pub fn with_scene(scene: Scene, config: EditorConfig) -> Self {
        let history = History::new(scene.elements(), config.history_limit);
        Self {
            scene,
            history,
            gesture: Gesture::Idle,
            config,
            listeners: Vec::new(),
            last_token: None,
            grab_offset: Point::default(),
        }
    }

    /// The current scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        self.scene.selection()
    }

    /// The gesture in progress.
    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Register a listener for scene and selection changes.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&EditorEvent, &Scene) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ---------------------------------------------------------------------
    // Scene I/O
    // ---------------------------------------------------------------------

    /// Replace the scene from its serialized form.
    ///
    /// History is reset and any gesture is dropped. Elements with unknown
    /// variant tags are skipped and returned.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedScene`] if the document fails
    /// validation. The current scene is left untouched in that case.
    pub fn load_scene(&mut self, json: &str) -> EngineResult<Vec<SkippedElement>> {
        let loaded = parse_scene(json)
            .inspect_err(|e| warn!(error = %e, "Scene load rejected, keeping current scene"))?;

        let had_selection = !self.scene.selection().is_empty();
        self.scene = loaded.document.into_scene();
        self.history.reset(self.scene.elements());
        self.gesture = Gesture::Idle;

        info!(
            elements = self.scene.element_count(),
            skipped = loaded.skipped.len(),
            width = self.scene.width,
            height = self.scene.height,
            "Scene loaded"
        );

        if had_selection {
            self.emit_selection();
        }
        self.emit(EditorEvent::SceneChanged {
            reason: ChangeReason::Loaded,
        });
        Ok(loaded.skipped)
    }

    /// Snapshot of the scene in document form.
    #[must_use]
    pub fn document(&self) -> SceneDocument {
        SceneDocument::from_scene(&self.scene)
    }

    /// Serialize the scene. Selection, gestures and history are not included.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize_scene(&self) -> EngineResult<String> {
        self.document().to_json()
    }

    /// Ask `surface` to rasterize the current scene.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Export`] if the surface fails.
    pub fn export_raster<S>(&self, surface: &S, format: RasterFormat) -> EngineResult<Vec<u8>>
    where
        S: RasterSurface,
    {
        let bytes = surface
            .rasterize(&self.scene, format)
            .map_err(|e| EngineError::Export(e.to_string()))?;
        info!(format = %format, bytes = bytes.len(), "Scene exported");
        Ok(bytes)
    }

    /// Change the canvas background. Not recorded in history.
    pub fn set_background(&mut self, color: impl Into<String>) {
        let color = color.into();
        if color == self.scene.background {
            return;
        }
        self.scene.background = color;
        self.emit(EditorEvent::SceneChanged {
            reason: ChangeReason::Background,
        });
    }

    // ---------------------------------------------------------------------
    // Element edits
    // ---------------------------------------------------------------------

    /// Create an element with variant defaults plus `overrides` and put it on top.
    pub fn add_element(
        &mut self,
        variant: ElementVariant,
        position: Point,
        size: Option<Size>,
        overrides: &ElementPatch,
    ) -> ElementId {
        let element = Element::create(variant, position, size, overrides);
        let id = self.scene.add_element(element);
        debug!(%id, %variant, "Element added");
        self.commit(ChangeReason::Added);
        id
    }

    /// Merge `patch` into an element. Returns whether anything changed.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        let Some(element) = self.scene.get_element_mut(id) else {
            warn!(%id, "Update ignored: element not in scene");
            return false;
        };
        let updated = element.updated(patch);
        if updated == *element {
            return false;
        }
        *element = updated;
        self.commit(ChangeReason::Updated);
        true
    }

    /// Delete an element. Returns whether it existed.
    pub fn delete_element(&mut self, id: ElementId) -> bool {
        self.delete_elements(&[id]) == 1
    }

    /// Delete every selected element. Returns how many were deleted.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.scene.selection().ids().to_vec();
        self.delete_elements(&ids)
    }

    fn delete_elements(&mut self, ids: &[ElementId]) -> usize {
        let selection_before = self.scene.selection().clone();
        let mut deleted = 0;
        for &id in ids {
            if self.gesture_targets(id) {
                self.cancel_gesture();
            }
            match self.scene.remove_element(id) {
                Ok(_) => deleted += 1,
                Err(e) => warn!(error = %e, "Delete ignored"),
            }
        }
        if deleted == 0 {
            return 0;
        }

        debug!(deleted, "Elements deleted");
        if *self.scene.selection() != selection_before {
            self.emit_selection();
        }
        self.commit(ChangeReason::Deleted);
        deleted
    }

    /// Copy an element with a fresh ID, offset it and stack it directly above
    /// the source. The copy becomes the selection.
    pub fn duplicate(&mut self, id: ElementId) -> Option<ElementId> {
        let Some(index) = self.scene.index_of(id) else {
            warn!(%id, "Duplicate ignored: element not in scene");
            return None;
        };
        let mut copy = self.scene.elements()[index].clone();
        copy.id = ElementId::new();
        copy.x += self.config.duplicate_offset;
        copy.y += self.config.duplicate_offset;

        let copy_id = self.scene.insert_at(index + 1, copy);
        debug!(source = %id, copy = %copy_id, "Element duplicated");
        self.commit(ChangeReason::Duplicated);
        if self.scene.set_selection(vec![copy_id]) {
            self.emit_selection();
        }
        Some(copy_id)
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Select a single element. Returns whether the selection changed.
    pub fn select(&mut self, id: ElementId) -> bool {
        if self.scene.index_of(id).is_none() {
            warn!(%id, "Select ignored: element not in scene");
            return false;
        }
        self.set_selection(vec![id])
    }

    /// Replace the selection. Unknown IDs are dropped.
    pub fn select_many(&mut self, ids: Vec<ElementId>) -> bool {
        self.set_selection(ids)
    }

    /// Add `id` to the selection, or drop it if already selected.
    pub fn toggle_selection(&mut self, id: ElementId) -> bool {
        if self.scene.index_of(id).is_none() {
            warn!(%id, "Toggle ignored: element not in scene");
            return false;
        }
        let mut ids = self.scene.selection().ids().to_vec();
        if let Some(pos) = ids.iter().position(|&selected| selected == id) {
            ids.remove(pos);
        } else {
            ids.push(id);
        }
        self.set_selection(ids)
    }

    /// Select every element.
    pub fn select_all(&mut self) -> bool {
        let ids = self.scene.elements().iter().map(|e| e.id).collect();
        self.set_selection(ids)
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) -> bool {
        let changed = self.scene.clear_selection();
        if changed {
            self.emit_selection();
        }
        changed
    }

    /// One box around everything selected.
    #[must_use]
    pub fn selection_bounds(&self) -> Option<Bounds> {
        union_bounds(self.scene.selected_elements())
    }

    fn set_selection(&mut self, ids: Vec<ElementId>) -> bool {
        let changed = self.scene.set_selection(ids);
        if changed {
            self.emit_selection();
        }
        changed
    }

    // ---------------------------------------------------------------------
    // Marquee
    // ---------------------------------------------------------------------

    /// Open a marquee at `point`, replacing any gesture in progress.
    pub fn start_selection(&mut self, point: Point) -> GestureToken {
        self.cancel_gesture();
        let token = self.next_token();
        self.gesture = Gesture::Selecting(Marquee::new(token, point));
        debug!(serial = token.serial(), x = point.x, y = point.y, "Marquee started");
        token
    }

    /// Move the marquee's free corner. Returns the updated rectangle.
    pub fn update_selection(&mut self, point: Point) -> Option<Bounds> {
        self.expire_gestures(Instant::now());
        let Gesture::Selecting(marquee) = &mut self.gesture else {
            return None;
        };
        marquee.update(point);
        Some(marquee.rect())
    }

    /// The open marquee, if any.
    #[must_use]
    pub fn marquee(&self) -> Option<&Marquee> {
        match &self.gesture {
            Gesture::Selecting(marquee) => Some(marquee),
            _ => None,
        }
    }

    /// Close the marquee and select what it touched.
    ///
    /// A marquee under the minimum size on both axes acts like a click on
    /// empty canvas and clears the selection. Returns `None` when no marquee
    /// was open, including one that outlived the timeout.
    pub fn finish_selection(&mut self) -> Option<MarqueeOutcome> {
        self.expire_gestures(Instant::now());
        let Gesture::Selecting(marquee) = self.gesture else {
            return None;
        };
        self.gesture = Gesture::Idle;

        let outcome = resolve_marquee(
            self.scene.elements(),
            marquee.rect(),
            self.config.min_marquee_size,
        );
        match &outcome {
            MarqueeOutcome::Click => {
                self.clear_selection();
            }
            MarqueeOutcome::Hits(ids) => {
                self.set_selection(ids.clone());
            }
        }
        debug!(serial = marquee.token.serial(), ?outcome, "Marquee finished");
        Some(outcome)
    }

    /// Cancel the marquee opened with `token`.
    ///
    /// Does nothing if that marquee already finished or a newer gesture has
    /// started. Returns whether a marquee was cancelled.
    pub fn cancel_marquee(&mut self, token: GestureToken) -> bool {
        match self.gesture {
            Gesture::Selecting(marquee) if marquee.token == token => {
                self.gesture = Gesture::Idle;
                debug!(serial = token.serial(), "Marquee cancelled");
                true
            }
            _ => {
                debug!(serial = token.serial(), "Stale marquee cancel ignored");
                false
            }
        }
    }

    /// Cancel a marquee that has been open longer than the configured timeout.
    pub fn expire_gestures(&mut self, now: Instant) -> bool {
        let Gesture::Selecting(marquee) = self.gesture else {
            return false;
        };
        if !marquee.token.is_expired(now, self.config.marquee_timeout()) {
            return false;
        }
        warn!(serial = marquee.token.serial(), "Marquee timed out");
        self.cancel_marquee(marquee.token)
    }

    // ---------------------------------------------------------------------
    // Move and transform gestures
    // ---------------------------------------------------------------------

    /// Start dragging an element. Returns `None` if it is missing or not draggable.
    pub fn begin_drag(&mut self, id: ElementId) -> Option<GestureToken> {
        let Some(element) = self.scene.get_element(id) else {
            warn!(%id, "Drag ignored: element not in scene");
            return None;
        };
        if !element.draggable {
            debug!(%id, "Drag ignored: element is locked");
            return None;
        }
        let origin = Point::new(element.x, element.y);

        self.cancel_gesture();
        let token = self.next_token();
        self.gesture = Gesture::Dragging {
            token,
            id,
            origin,
            current: origin,
        };
        debug!(%id, serial = token.serial(), "Drag started");
        Some(token)
    }

    /// Record the dragged element's preview position. The scene is not touched.
    pub fn update_drag(&mut self, position: Point) -> bool {
        let Gesture::Dragging { current, .. } = &mut self.gesture else {
            return false;
        };
        *current = position;
        true
    }

    /// Finish the drag with the element at `position`. Always commits.
    pub fn end_drag(&mut self, position: Point) -> bool {
        let Gesture::Dragging { id, .. } = self.gesture else {
            return false;
        };
        self.gesture = Gesture::Idle;

        let Some(element) = self.scene.get_element_mut(id) else {
            warn!(%id, "Drag end ignored: element not in scene");
            return false;
        };
        element.x = position.x;
        element.y = position.y;
        debug!(%id, x = position.x, y = position.y, "Drag committed");
        self.commit(ChangeReason::Moved);
        true
    }

    /// Start a resize/rotate gesture on an element.
    pub fn begin_transform(&mut self, id: ElementId) -> Option<GestureToken> {
        if self.scene.index_of(id).is_none() {
            warn!(%id, "Transform ignored: element not in scene");
            return None;
        }
        self.cancel_gesture();
        let token = self.next_token();
        self.gesture = Gesture::Transforming { token, id };
        debug!(%id, serial = token.serial(), "Transform started");
        Some(token)
    }

    /// Finish the resize/rotate gesture, baking the scale into the element's size.
    pub fn end_transform(&mut self, delta: &TransformDelta) -> Option<FieldUpdates> {
        let Gesture::Transforming { id, .. } = self.gesture else {
            return None;
        };
        self.gesture = Gesture::Idle;

        let tolerance = self.config.corner_tolerance;
        let Some(element) = self.scene.get_element_mut(id) else {
            warn!(%id, "Transform end ignored: element not in scene");
            return None;
        };
        let updates = resolve_transform(element, delta, tolerance);
        updates.apply_to(element);
        debug!(%id, handle = ?updates.handle, "Transform committed");
        self.commit(ChangeReason::Transformed);
        Some(updates)
    }

    /// Run a whole resize/rotate gesture in one call.
    pub fn transform_element(&mut self, id: ElementId, delta: &TransformDelta) -> Option<FieldUpdates> {
        self.begin_transform(id)?;
        self.end_transform(delta)
    }

    /// Abandon the gesture in progress. The scene is left as it was.
    pub fn cancel_gesture(&mut self) -> bool {
        if self.gesture.is_idle() {
            return false;
        }
        debug!(gesture = self.gesture.name(), "Gesture cancelled");
        self.gesture = Gesture::Idle;
        true
    }

    fn gesture_targets(&self, target: ElementId) -> bool {
        matches!(
            self.gesture,
            Gesture::Dragging { id, .. } | Gesture::Transforming { id, .. } if id == target
        )
    }

    fn next_token(&mut self) -> GestureToken {
        let token = self
            .last_token
            .map_or_else(GestureToken::first, GestureToken::next);
        self.last_token = Some(token);
        token
    }

    // ---------------------------------------------------------------------
    // Layering
    // ---------------------------------------------------------------------

    /// Swap an element with the one directly above it.
    pub fn bring_forward(&mut self, id: ElementId) -> bool {
        self.reorder(id, LayerMove::Forward)
    }

    /// Swap an element with the one directly below it.
    pub fn send_backward(&mut self, id: ElementId) -> bool {
        self.reorder(id, LayerMove::Backward)
    }

    /// Move an element to the top of the stack.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        self.reorder(id, LayerMove::ToFront)
    }

    /// Move an element to the bottom of the stack.
    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        self.reorder(id, LayerMove::ToBack)
    }

    /// Apply a z-order change. Commits only if the order actually changed.
    pub fn reorder(&mut self, id: ElementId, mv: LayerMove) -> bool {
        if self.scene.index_of(id).is_none() {
            warn!(%id, op = mv.name(), "Reorder ignored: element not in scene");
            return false;
        }
        if !reorder(self.scene.elements_mut(), id, mv) {
            return false;
        }
        debug!(%id, op = mv.name(), "Element reordered");
        self.commit(ChangeReason::Reordered);
        true
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    /// Step back one commit. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        let elements = snapshot.elements().to_vec();
        self.restore(elements, ChangeReason::Undo);
        true
    }

    /// Step forward one commit. Returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        let elements = snapshot.elements().to_vec();
        self.restore(elements, ChangeReason::Redo);
        true
    }

    /// Whether [`undo`](Self::undo) would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The undo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    fn restore(&mut self, elements: Vec<Element>, reason: ChangeReason) {
        let selection_changed = self.scene.replace_elements(elements);
        debug!(step = self.history.step(), ?reason, "History restored");
        if selection_changed {
            self.emit_selection();
        }
        self.emit(EditorEvent::SceneChanged { reason });
    }

    fn commit(&mut self, reason: ChangeReason) {
        self.history.commit(self.scene.elements());
        self.emit(EditorEvent::SceneChanged { reason });
    }

    // ---------------------------------------------------------------------
    // Print quality
    // ---------------------------------------------------------------------

    /// DPI report for one image element. `None` for missing or non-image elements.
    #[must_use]
    pub fn analyze_image(&self, id: ElementId) -> Option<DpiReport> {
        let element = self.scene.get_element(id)?;
        analyze_image(
            self.scene.width,
            self.scene.height,
            element,
            self.config.print_dpi,
        )
    }

    /// DPI reports for every image element, back to front.
    #[must_use]
    pub fn analyze_images(&self) -> Vec<(ElementId, DpiReport)> {
        self.scene
            .elements()
            .iter()
            .filter_map(|e| {
                analyze_image(self.scene.width, self.scene.height, e, self.config.print_dpi)
                    .map(|report| (e.id, report))
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Input dispatch
    // ---------------------------------------------------------------------

    /// Route a raw input event. Returns whether the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.expire_gestures(Instant::now());
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(Point::new(*x, *y), *modifiers);
                true
            }
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(*x, *y)),
            InputEvent::PointerCancel => self.cancel_gesture(),
            InputEvent::Key { key, modifiers } => match KeyCommand::from_key(key, *modifiers) {
                Some(command) => {
                    self.run_command(command);
                    true
                }
                None => false,
            },
        }
    }

    fn pointer_down(&mut self, point: Point, modifiers: KeyModifiers) {
        let Some(id) = self.scene.element_at(point) else {
            self.start_selection(point);
            return;
        };

        if modifiers.shift {
            self.toggle_selection(id);
            return;
        }
        if !self.scene.selection().contains(id) {
            self.select(id);
        }
        if self.begin_drag(id).is_some() {
            if let Some(element) = self.scene.get_element(id) {
                self.grab_offset = Point::new(point.x - element.x, point.y - element.y);
            }
        }
    }

    fn pointer_move(&mut self, point: Point) -> bool {
        match self.gesture {
            Gesture::Dragging { .. } => self.update_drag(self.drag_position(point)),
            Gesture::Selecting(_) => self.update_selection(point).is_some(),
            Gesture::Idle | Gesture::Transforming { .. } => false,
        }
    }

    fn pointer_up(&mut self, point: Point) -> bool {
        match self.gesture {
            Gesture::Dragging { origin, .. } => {
                let position = self.drag_position(point);
                if position == origin {
                    // A click on an element: nothing moved, nothing to commit.
                    self.cancel_gesture()
                } else {
                    self.end_drag(position)
                }
            }
            Gesture::Selecting(_) => {
                self.update_selection(point);
                self.finish_selection().is_some()
            }
            Gesture::Idle | Gesture::Transforming { .. } => false,
        }
    }

    fn drag_position(&self, pointer: Point) -> Point {
        Point::new(pointer.x - self.grab_offset.x, pointer.y - self.grab_offset.y)
    }

    fn run_command(&mut self, command: KeyCommand) {
        match command {
            KeyCommand::Delete => {
                self.delete_selected();
            }
            KeyCommand::Undo => {
                self.undo();
            }
            KeyCommand::Redo => {
                self.redo();
            }
            KeyCommand::Duplicate => {
                if let Some(id) = self.scene.selection().primary() {
                    self.duplicate(id);
                }
            }
            KeyCommand::SelectAll => {
                self.select_all();
            }
            KeyCommand::Escape => {
                self.cancel_gesture();
                self.clear_selection();
            }
        }
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    fn emit_selection(&mut self) {
        let ids = self.scene.selection().ids().to_vec();
        self.emit(EditorEvent::SelectionChanged { ids });
    }

    fn emit(&mut self, event: EditorEvent) {
        let scene = &self.scene;
        for listener in &mut self.listeners {
            listener(&event, scene);
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("scene", &self.scene)
            .field("history_step", &self.history.step())
            .field("gesture", &self.gesture.name())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
