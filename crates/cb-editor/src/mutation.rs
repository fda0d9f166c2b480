//! Board mutations and their effects.
//!
//! Every model change funnels through `BoardMutation` so the engine has
//! one place to decide what changed and whether it must be persisted.
//! Pointer gestures, the keyboard, and the bridge API all end up here.

use cb_core::model::{Anchor, Color, ItemId, NoteType};

#[derive(Debug, Clone, PartialEq)]
pub enum BoardMutation {
    AddNote {
        x: f64,
        y: f64,
        note_type: NoteType,
    },
    AddMedia {
        x: f64,
        y: f64,
        media_data_url: String,
    },
    MoveItem {
        id: ItemId,
        x: f64,
        y: f64,
    },
    ResizeItem {
        id: ItemId,
        width: f64,
        height: f64,
    },
    /// Full note edit as submitted by the edit form.
    EditNote {
        id: ItemId,
        title: String,
        content: String,
        note_type: NoteType,
        color: Color,
    },
    /// Image decoded; height re-derives from the ratio.
    SetAspectRatio {
        id: ItemId,
        ratio: f64,
    },
    SetHighlighter {
        id: ItemId,
        data: Option<String>,
    },
    RemoveItem {
        id: ItemId,
    },
    AddConnection {
        from: ItemId,
        to: ItemId,
        from_anchor: Anchor,
        to_anchor: Anchor,
    },
    /// Cut every string, keep the items.
    ClearConnections,
    /// Clear the whole board.
    ClearItems,
    SetBoardSize {
        width: f64,
        height: f64,
    },
}

/// What applying a mutation (or handling an event) did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Effect {
    /// The scene must be redrawn.
    pub changed: bool,
    /// The board must be saved.
    pub persist: bool,
    /// Id of a freshly created item.
    pub created: Option<ItemId>,
    /// The request was refused (out-of-range board size); the shell
    /// should tell the user.
    pub rejected: bool,
}

impl Effect {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    pub fn saved() -> Self {
        Self {
            changed: true,
            persist: true,
            ..Self::default()
        }
    }

    pub fn rejected() -> Self {
        Self {
            rejected: true,
            ..Self::default()
        }
    }

    pub fn with_created(mut self, id: ItemId) -> Self {
        self.created = Some(id);
        self
    }
}
