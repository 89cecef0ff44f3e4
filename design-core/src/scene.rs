//! The scene: an ordered element sequence plus canvas properties and selection.

use crate::element::{Element, ElementId, Point};
use crate::error::{EngineError, EngineResult};
use crate::geometry::bounds_of;
use crate::selection::Selection;

/// Default canvas background.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// A scene containing all design elements.
///
/// Element order is stacking order: index 0 is drawn first (back-most).
/// The selection only ever names elements that are in the sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    elements: Vec<Element>,
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    /// Background color.
    pub background: String,
    selection: Selection,
}

impl Scene {
    /// Create a new empty scene with the given canvas size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            elements: Vec::new(),
            width,
            height,
            background: DEFAULT_BACKGROUND.to_string(),
            selection: Selection::new(),
        }
    }

    /// Append an element on top of the stack.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.elements.push(element);
        id
    }

    /// Insert an element at `index` (clamped to the sequence length).
    pub fn insert_at(&mut self, index: usize, element: Element) -> ElementId {
        let id = element.id;
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
        id
    }

    /// Remove an element from the scene and from the selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&mut self, id: ElementId) -> EngineResult<Element> {
        let index = self
            .index_of(id)
            .ok_or(EngineError::InvalidSelectionReference(id))?;
        self.selection.remove(id);
        Ok(self.elements.remove(index))
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Stacking index of an element.
    #[must_use]
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// All elements, back to front.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut Vec<Element> {
        &mut self.elements
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Find the top-most visible element whose bounds contain `point`.
    #[must_use]
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.visible && bounds_of(e).contains(point))
            .map(|e| e.id)
    }

    /// Remove every element and clear the selection.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.selection.clear();
    }

    /// Replace the element sequence wholesale, dropping stale selection entries.
    ///
    /// Returns whether the selection changed.
    pub(crate) fn replace_elements(&mut self, elements: Vec<Element>) -> bool {
        self.elements = elements;
        let elements = &self.elements;
        self.selection
            .retain(|id| elements.iter().any(|e| e.id == id))
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the selection. IDs not in the scene are dropped.
    ///
    /// Returns whether the selection changed.
    pub(crate) fn set_selection(&mut self, ids: Vec<ElementId>) -> bool {
        let ids = ids
            .into_iter()
            .filter(|&id| self.index_of(id).is_some())
            .collect();
        self.selection.set(ids)
    }

    /// Clear the selection. Returns whether it changed.
    pub(crate) fn clear_selection(&mut self) -> bool {
        self.selection.clear()
    }

    /// Selected elements, in selection order.
    pub fn selected_elements(&self) -> impl Iterator<Item = &Element> {
        self.selection
            .ids()
            .iter()
            .filter_map(|&id| self.get_element(id))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(1200.0, 600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, RectShape};

    fn rect(x: f32, y: f32) -> Element {
        Element::new(ElementKind::Rect(RectShape {
            width: 50.0,
            height: 50.0,
            fill: "#fff".to_string(),
            stroke: "#000".to_string(),
            stroke_width: 0.0,
            corner_radius: 0.0,
        }))
        .at(x, y)
    }

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::new(800.0, 600.0);
        assert!(scene.is_empty());

        let id = scene.add_element(rect(0.0, 0.0));
        assert_eq!(scene.element_count(), 1);
        assert!(scene.get_element(id).is_some());

        let removed = scene.remove_element(id).expect("remove");
        assert_eq!(removed.id, id);
        assert!(scene.is_empty());
        assert!(matches!(
            scene.remove_element(id),
            Err(EngineError::InvalidSelectionReference(missing)) if missing == id
        ));
    }

    #[test]
    fn test_remove_drops_selection_entry() {
        let mut scene = Scene::default();
        let a = scene.add_element(rect(0.0, 0.0));
        let b = scene.add_element(rect(10.0, 10.0));
        assert!(scene.set_selection(vec![a, b]));

        scene.remove_element(a).expect("remove");
        assert_eq!(scene.selection().ids(), &[b]);
    }

    #[test]
    fn test_set_selection_ignores_unknown_ids() {
        let mut scene = Scene::default();
        let a = scene.add_element(rect(0.0, 0.0));
        scene.set_selection(vec![a, ElementId::new()]);
        assert_eq!(scene.selection().ids(), &[a]);
    }

    #[test]
    fn test_element_at_picks_topmost_visible() {
        let mut scene = Scene::default();
        let bottom = scene.add_element(rect(0.0, 0.0));
        let top = scene.add_element(rect(25.0, 25.0));

        assert_eq!(scene.element_at(Point::new(30.0, 30.0)), Some(top));
        assert_eq!(scene.element_at(Point::new(10.0, 10.0)), Some(bottom));
        assert_eq!(scene.element_at(Point::new(500.0, 500.0)), None);

        if let Some(element) = scene.get_element_mut(top) {
            element.visible = false;
        }
        assert_eq!(scene.element_at(Point::new(30.0, 30.0)), Some(bottom));
    }

    #[test]
    fn test_replace_elements_prunes_selection() {
        let mut scene = Scene::default();
        let a = scene.add_element(rect(0.0, 0.0));
        scene.set_selection(vec![a]);

        assert!(scene.replace_elements(Vec::new()));
        assert!(scene.selection().is_empty());
    }

    #[test]
    fn test_insert_at_clamps_index() {
        let mut scene = Scene::default();
        let a = scene.add_element(rect(0.0, 0.0));
        let b = scene.insert_at(0, rect(1.0, 1.0));
        let c = scene.insert_at(99, rect(2.0, 2.0));
        let order: Vec<_> = scene.elements().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![b, a, c]);
    }
}
