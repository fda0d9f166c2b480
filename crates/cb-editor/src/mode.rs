//! The single interaction mode.
//!
//! One tagged enum instead of a pile of `is_dragging`/`is_connecting`
//! booleans: gestures are mutually exclusive by construction, and each
//! arm carries exactly the transient state that gesture needs. Anything
//! that ends a gesture drops that state with it.

use cb_core::model::{Anchor, ItemId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Idle,
    /// An item follows the pointer. The grab offset keeps the item from
    /// jumping to the cursor on pick-up.
    Dragging {
        id: ItemId,
        grab_dx: f64,
        grab_dy: f64,
    },
    /// The bottom-right handle follows the pointer. Sizes grow by the
    /// board-space pointer delta from the gesture origin.
    Resizing {
        id: ItemId,
        origin_x: f64,
        origin_y: f64,
        start_width: f64,
        start_height: f64,
    },
    /// A string is being drawn from `source`'s `anchor` to the pointer.
    Connecting { source: ItemId, anchor: Anchor },
    /// The board background follows the pointer, screen space.
    Panning { last_x: f64, last_y: f64 },
}

impl Mode {
    pub fn is_idle(&self) -> bool {
        matches!(self, Mode::Idle)
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, Mode::Connecting { .. })
    }

    /// The item a drag is carrying, if any. The renderer draws it above
    /// its peers.
    pub fn dragged_item(&self) -> Option<ItemId> {
        match self {
            Mode::Dragging { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Whether the current gesture is acting on `id`. Removing that item
    /// has to end the gesture too.
    pub fn involves(&self, id: ItemId) -> bool {
        match self {
            Mode::Dragging { id: held, .. } | Mode::Resizing { id: held, .. } => *held == id,
            Mode::Connecting { source, .. } => *source == id,
            Mode::Idle | Mode::Panning { .. } => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Dragging { .. } => "dragging",
            Mode::Resizing { .. } => "resizing",
            Mode::Connecting { .. } => "connecting",
            Mode::Panning { .. } => "panning",
        }
    }
}
