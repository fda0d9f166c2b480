//! Corkboard editor engine.
//!
//! Turns pointer and keyboard events into board mutations:
//!
//! - [`input`]: platform-neutral input event type
//! - [`mode`]: the single interaction mode (drag, resize, connect, pan)
//! - [`mutation`]: the mutation vocabulary and its [`mutation::Effect`]
//! - [`engine`]: the [`engine::EditorEngine`] that routes events
//! - [`shortcuts`]: keyboard bindings shared with the WASM bridge

pub mod engine;
pub mod input;
pub mod mode;
pub mod mutation;
pub mod shortcuts;

pub use engine::EditorEngine;
pub use input::InputEvent;
pub use mode::Mode;
pub use mutation::{BoardMutation, Effect};
pub use shortcuts::{ShortcutAction, ShortcutMap};
