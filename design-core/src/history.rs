//! Linear undo/redo history of element-sequence snapshots.

use crate::element::Element;

/// An immutable copy of the scene's element sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    elements: Vec<Element>,
}

impl Snapshot {
    /// Capture a deep copy of `elements`.
    #[must_use]
    pub fn capture(elements: &[Element]) -> Self {
        Self {
            elements: elements.to_vec(),
        }
    }

    /// The captured elements, back to front.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}

/// Snapshot stack with a cursor.
///
/// The snapshot under the cursor always equals the scene's current elements.
/// Committing after an undo drops the redo tail; there is no branching.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    step: usize,
    limit: Option<usize>,
}

impl History {
    /// Start a history whose first entry is `initial`.
    ///
    /// `limit` caps the number of snapshots kept and is raised to at least 1.
    /// `None` keeps every snapshot.
    #[must_use]
    pub fn new(initial: &[Element], limit: Option<usize>) -> Self {
        Self {
            snapshots: vec![Snapshot::capture(initial)],
            step: 0,
            limit: limit.map(|l| l.max(1)),
        }
    }

    /// Forget everything and restart from `initial`.
    pub fn reset(&mut self, initial: &[Element]) {
        self.snapshots.clear();
        self.snapshots.push(Snapshot::capture(initial));
        self.step = 0;
    }

    /// Record `elements` as the newest state.
    pub fn commit(&mut self, elements: &[Element]) {
        self.snapshots.truncate(self.step + 1);
        self.snapshots.push(Snapshot::capture(elements));
        if let Some(limit) = self.limit {
            if self.snapshots.len() > limit {
                let excess = self.snapshots.len() - limit;
                self.snapshots.drain(..excess);
            }
        }
        self.step = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. `None` when already at the oldest.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.step == 0 {
            return None;
        }
        self.step -= 1;
        self.snapshots.get(self.step)
    }

    /// Step forward one snapshot. `None` when already at the newest.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.step + 1 >= self.snapshots.len() {
            return None;
        }
        self.step += 1;
        self.snapshots.get(self.step)
    }

    /// Whether [`undo`](Self::undo) would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.step > 0
    }

    /// Whether [`redo`](Self::redo) would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.step + 1 < self.snapshots.len()
    }

    /// Cursor position.
    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; a history holds at least its initial snapshot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, TextAlign, TextShape, VerticalAlign};

    fn text(content: &str) -> Element {
        Element::new(ElementKind::Text(TextShape {
            text: content.to_string(),
            font_family: "Arial".to_string(),
            font_size: 24.0,
            fill: "#000000".to_string(),
            align: TextAlign::Left,
            vertical_align: VerticalAlign::Top,
            line_height: 1.0,
            letter_spacing: 0.0,
            padding: 0.0,
            width: 100.0,
            height: 30.0,
        }))
    }

    #[test]
    fn test_new_history_cannot_undo_or_redo() {
        let mut history = History::new(&[], None);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_undo_redo_walks_snapshots() {
        let a = text("a");
        let b = text("b");
        let mut history = History::new(&[], None);
        history.commit(&[a.clone()]);
        history.commit(&[a.clone(), b.clone()]);

        assert_eq!(history.undo().map(|s| s.elements().len()), Some(1));
        assert_eq!(history.undo().map(|s| s.elements().len()), Some(0));
        assert!(history.undo().is_none());
        assert_eq!(history.redo().map(|s| s.elements().len()), Some(1));
        assert_eq!(
            history.redo().map(Snapshot::elements),
            Some([a, b].as_slice())
        );
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_commit_after_undo_truncates_redo_tail() {
        let mut history = History::new(&[], None);
        history.commit(&[text("1")]);
        history.commit(&[text("2")]);
        history.undo();
        assert!(history.can_redo());

        history.commit(&[text("3")]);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(history.step(), 2);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(&[], Some(3));
        for i in 0..5 {
            history.commit(&[text(&i.to_string())]);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.step(), 2);
        assert!(history.undo().is_some());
        assert!(history.undo().is_some());
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_unbounded_keeps_every_snapshot() {
        let mut history = History::new(&[], None);
        for i in 0..500 {
            history.commit(&[text(&i.to_string())]);
        }
        assert_eq!(history.len(), 501);
        let mut undone = 0;
        while history.undo().is_some() {
            undone += 1;
        }
        assert_eq!(undone, 500);
        assert!(history.current().is_some_and(|s| s.elements().is_empty()));
    }

    #[test]
    fn test_zero_limit_is_raised_to_one() {
        let mut history = History::new(&[], Some(0));
        history.commit(&[text("a")]);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_reset() {
        let mut history = History::new(&[], None);
        history.commit(&[text("x")]);
        history.reset(&[]);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(history.current().is_some_and(|s| s.elements().is_empty()));
    }
}
