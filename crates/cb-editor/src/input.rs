//! Input abstraction layer.
//!
//! Normalizes browser pointer, wheel, and keyboard events into a unified
//! `InputEvent` enum consumed by the engine. Coordinates are screen px
//! relative to the canvas; the engine does its own screen → board
//! conversion, so callers never pre-transform.

/// A normalized input event.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start).
    PointerDown {
        x: f64,
        y: f64,
        /// `PointerEvent.button`: 0 = primary.
        button: i16,
    },

    /// Pointer moved.
    PointerMove { x: f64, y: f64 },

    /// Pointer released.
    PointerUp { x: f64, y: f64 },

    /// Wheel scroll, zooms toward the pointer.
    Wheel { x: f64, y: f64, delta_y: f64 },

    /// Keyboard shortcut.
    Key {
        key: String,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    },
}

impl InputEvent {
    /// Create a PointerDown from a web PointerEvent.
    /// (Used when bridging from JS via wasm-bindgen.)
    pub fn from_pointer_down(x: f64, y: f64, button: i16) -> Self {
        Self::PointerDown { x, y, button }
    }

    pub fn from_pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn from_pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::Wheel { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }
}
