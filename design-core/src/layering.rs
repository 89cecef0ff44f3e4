//! Z-order changes. Index 0 of the element sequence is the back-most element.

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId};

/// A z-order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerMove {
    /// Swap with the element directly above.
    Forward,
    /// Swap with the element directly below.
    Backward,
    /// Move to the top of the stack.
    ToFront,
    /// Move to the bottom of the stack.
    ToBack,
}

impl LayerMove {
    /// Name used in logs and change notifications.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Forward => "bring_forward",
            Self::Backward => "send_backward",
            Self::ToFront => "bring_to_front",
            Self::ToBack => "send_to_back",
        }
    }
}

/// Apply `mv` to the element `id`.
///
/// Returns `false` without touching the sequence when the element is missing
/// or already at the relevant end of the stack.
pub fn reorder(elements: &mut Vec<Element>, id: ElementId, mv: LayerMove) -> bool {
    let Some(index) = elements.iter().position(|e| e.id == id) else {
        return false;
    };
    let last = elements.len() - 1;

    match mv {
        LayerMove::Forward if index < last => elements.swap(index, index + 1),
        LayerMove::Backward if index > 0 => elements.swap(index, index - 1),
        LayerMove::ToFront if index < last => {
            let element = elements.remove(index);
            elements.push(element);
        }
        LayerMove::ToBack if index > 0 => {
            let element = elements.remove(index);
            elements.insert(0, element);
        }
        _ => return false,
    }
    true
}
