//! Selection state and marquee (drag-rectangle) selection.

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId, Point};
use crate::geometry::{bounds_of, Bounds};
use crate::gesture::GestureToken;

/// How many elements are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Nothing selected.
    None,
    /// Exactly one element selected; it is the primary.
    Single,
    /// Two or more elements selected; no primary.
    Multi,
}

/// The set of selected element IDs, in selection order.
///
/// Holds references only; the scene owns the elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    /// An empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected IDs.
    #[must_use]
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    /// Number of selected elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    /// The primary element, present only when exactly one is selected.
    #[must_use]
    pub fn primary(&self) -> Option<ElementId> {
        match self.ids.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        match self.ids.len() {
            0 => SelectionMode::None,
            1 => SelectionMode::Single,
            _ => SelectionMode::Multi,
        }
    }

    /// Replace the selection with a single element. Returns whether it changed.
    pub fn set_single(&mut self, id: ElementId) -> bool {
        self.set(vec![id])
    }

    /// Replace the selection with `ids` (duplicates dropped). Returns whether it changed.
    pub fn set(&mut self, ids: Vec<ElementId>) -> bool {
        let mut deduped = Vec::with_capacity(ids.len());
        for id in ids {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        if deduped == self.ids {
            return false;
        }
        self.ids = deduped;
        true
    }

    /// Clear the selection. Returns whether it changed.
    pub fn clear(&mut self) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        self.ids.clear();
        true
    }

    /// Drop `id` from the selection. Returns whether it was selected.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&selected| selected != id);
        self.ids.len() != before
    }

    /// Keep only IDs for which `keep` returns true. Returns whether anything was dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> bool
    where
        F: FnMut(ElementId) -> bool,
    {
        let before = self.ids.len();
        self.ids.retain(|&id| keep(id));
        self.ids.len() != before
    }
}

/// An in-progress drag-select rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    /// Identity of the gesture that opened this marquee.
    pub token: GestureToken,
    /// Where the drag started.
    pub start: Point,
    /// Latest pointer position.
    pub current: Point,
}

impl Marquee {
    /// Open a zero-size marquee at `start`.
    #[must_use]
    pub fn new(token: GestureToken, start: Point) -> Self {
        Self {
            token,
            start,
            current: start,
        }
    }

    /// Move the free corner.
    pub fn update(&mut self, point: Point) {
        self.current = point;
    }

    /// The well-formed rectangle, even when dragging up or left.
    #[must_use]
    pub fn rect(&self) -> Bounds {
        Bounds::from_corners(self.start, self.current)
    }
}

/// What a finished marquee amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarqueeOutcome {
    /// Too small to be a drag; behaves like a click on empty canvas.
    Click,
    /// IDs of every element the rectangle touched, back to front.
    Hits(Vec<ElementId>),
}

/// Resolve a marquee rectangle against the scene elements.
#[must_use]
pub fn resolve_marquee(elements: &[Element], rect: Bounds, min_size: f32) -> MarqueeOutcome {
    let rect = rect.normalized();
    if rect.width < min_size && rect.height < min_size {
        return MarqueeOutcome::Click;
    }

    MarqueeOutcome::Hits(
        elements
            .iter()
            .filter(|e| bounds_of(e).intersects(&rect))
            .map(|e| e.id)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, RectShape};

    fn square(x: f32, y: f32) -> Element {
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
    fn test_selection_modes() {
        let mut selection = Selection::new();
        assert_eq!(selection.mode(), SelectionMode::None);
        assert!(selection.primary().is_none());

        let a = ElementId::new();
        let b = ElementId::new();
        assert!(selection.set_single(a));
        assert_eq!(selection.mode(), SelectionMode::Single);
        assert_eq!(selection.primary(), Some(a));

        assert!(selection.set(vec![a, b, a]));
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.mode(), SelectionMode::Multi);
        assert!(selection.primary().is_none());
    }

    #[test]
    fn test_set_reports_changes() {
        let mut selection = Selection::new();
        let a = ElementId::new();
        assert!(selection.set_single(a));
        assert!(!selection.set_single(a));
        assert!(selection.remove(a));
        assert!(!selection.remove(a));
        assert!(!selection.clear());
    }

    #[test]
    fn test_marquee_rect_is_well_formed_when_dragging_up_left() {
        let mut marquee = Marquee::new(GestureToken::first(), Point::new(60.0, 60.0));
        marquee.update(Point::new(10.0, 20.0));
        assert_eq!(marquee.rect(), Bounds::new(10.0, 20.0, 50.0, 40.0));
    }

    #[test]
    fn test_resolve_marquee() {
        let elements = vec![square(0.0, 0.0), square(100.0, 100.0)];
        let a = elements[0].id;
        let b = elements[1].id;

        let only_a = resolve_marquee(&elements, Bounds::new(10.0, 10.0, 50.0, 50.0), 10.0);
        assert_eq!(only_a, MarqueeOutcome::Hits(vec![a]));

        let both = resolve_marquee(&elements, Bounds::new(0.0, 0.0, 200.0, 200.0), 10.0);
        assert_eq!(both, MarqueeOutcome::Hits(vec![a, b]));

        let tiny = resolve_marquee(&elements, Bounds::new(0.0, 0.0, 5.0, 5.0), 10.0);
        assert_eq!(tiny, MarqueeOutcome::Click);
    }

    #[test]
    fn test_thin_marquee_is_not_a_click() {
        let elements = vec![square(0.0, 0.0)];
        let outcome = resolve_marquee(&elements, Bounds::new(-5.0, 10.0, 100.0, 2.0), 10.0);
        assert_eq!(outcome, MarqueeOutcome::Hits(vec![elements[0].id]));
    }
}
