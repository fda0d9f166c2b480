//! The editor engine: pointer and key events in, board mutations out.
//!
//! The engine owns the open [`Board`], the [`Viewport`] and the single
//! interaction [`Mode`]. Every input event funnels through
//! [`EditorEngine::handle_event`], which routes it by the current mode,
//! hit-tests through the viewport transform, and applies the resulting
//! [`BoardMutation`]s. The returned [`Effect`] tells the embedder
//! whether to redraw and whether the board needs persisting.
//!
//! The engine is platform-free: it never touches the DOM or storage.
//! The wasm controller feeds it events and acts on the effects.

use kurbo::Point;

use cb_core::board::Board;
use cb_core::model::{Anchor, Item, ItemId, MEDIA_DEFAULT_WIDTH, NoteType};
use cb_core::snapshot::Snapshot;
use cb_core::viewport::Viewport;
use cb_render::anchor;
use cb_render::hit::{HitTarget, hit_test};

use crate::input::InputEvent;
use crate::mode::Mode;
use crate::mutation::{BoardMutation, Effect};
use crate::shortcuts::{ShortcutAction, ShortcutMap};

/// Margin kept between a randomly placed note and the board edge.
const SPAWN_MARGIN: f64 = 25.0;

pub struct EditorEngine {
    /// The open board (single source of truth for items and strings).
    pub board: Board,

    /// Screen ↔ board mapping. Pan and zoom land here.
    pub viewport: Viewport,

    /// The current gesture. Exactly one at a time.
    mode: Mode,

    /// Last pointer position in board space. Feeds the string preview.
    pointer_board: Point,

    /// Whether connection strings are drawn at all.
    strings_visible: bool,
}

impl EditorEngine {
    /// A fresh engine around an empty board, fitted to the given canvas
    /// size.
    pub fn new(screen_width: f64, screen_height: f64) -> Self {
        let board = Board::new();
        let mut viewport = Viewport::new(screen_width, screen_height);
        viewport.reset_to_fit(board.width, board.height);
        Self {
            board,
            viewport,
            mode: Mode::Idle,
            pointer_board: Point::ZERO,
            strings_visible: true,
        }
    }

    /// Swap in another board (slot switch or import). Any running
    /// gesture is dropped and the view refits the incoming extent.
    pub fn open_board(&mut self, board: Board) {
        self.board = board;
        self.mode = Mode::Idle;
        self.viewport
            .reset_to_fit(self.board.width, self.board.height);
    }

    pub fn open_snapshot(&mut self, snapshot: &Snapshot) {
        self.open_board(Board::from_snapshot(snapshot));
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn strings_visible(&self) -> bool {
        self.strings_visible
    }

    /// Flip string visibility, returning the new state.
    pub fn toggle_strings(&mut self) -> bool {
        self.strings_visible = !self.strings_visible;
        self.strings_visible
    }

    /// While connecting, the live string from the source anchor to the
    /// pointer, in board space.
    pub fn connection_preview(&self) -> Option<(Point, Point)> {
        if let Mode::Connecting { source, anchor } = self.mode {
            let item = self.board.get_by_id(source)?;
            let start = anchor::resolve(&item.bounds(), Some(anchor));
            return Some((start, self.pointer_board));
        }
        None
    }

    // ─── Event routing ───────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: &InputEvent) -> Effect {
        match event {
            InputEvent::PointerDown { x, y, button } => self.pointer_down(*x, *y, *button),
            InputEvent::PointerMove { x, y } => self.pointer_move(*x, *y),
            InputEvent::PointerUp { .. } => self.pointer_up(),
            InputEvent::Wheel { x, y, delta_y } => {
                self.viewport.wheel_zoom(*delta_y, Point::new(*x, *y));
                Effect::redraw()
            }
            InputEvent::Key {
                key,
                ctrl,
                shift,
                alt,
                meta,
            } => self.key_down(key, *ctrl, *shift, *alt, *meta),
        }
    }

    fn pointer_down(&mut self, x: f64, y: f64, button: i16) -> Effect {
        if button != 0 {
            return Effect::none();
        }
        let p = self.viewport.screen_to_board(Point::new(x, y));
        self.pointer_board = p;

        match self.mode {
            Mode::Idle => match hit_test(&self.board, p) {
                Some(HitTarget::AnchorDot { id, anchor }) => {
                    self.mode = Mode::Connecting { source: id, anchor };
                    log::debug!("string started from {id} ({})", anchor.as_str());
                    Effect::redraw()
                }
                Some(HitTarget::ResizeHandle(id)) => {
                    let Some(item) = self.board.get_by_id(id) else {
                        return Effect::none();
                    };
                    self.mode = Mode::Resizing {
                        id,
                        origin_x: p.x,
                        origin_y: p.y,
                        start_width: item.width,
                        start_height: item.height,
                    };
                    Effect::none()
                }
                Some(HitTarget::Item(id)) => {
                    let Some(item) = self.board.get_by_id(id) else {
                        return Effect::none();
                    };
                    self.mode = Mode::Dragging {
                        id,
                        grab_dx: p.x - item.x,
                        grab_dy: p.y - item.y,
                    };
                    // The held card pops above its peers right away.
                    Effect::redraw()
                }
                None => {
                    self.mode = Mode::Panning {
                        last_x: x,
                        last_y: y,
                    };
                    Effect::none()
                }
            },
            Mode::Connecting { source, anchor } => match hit_test(&self.board, p) {
                Some(HitTarget::AnchorDot {
                    id,
                    anchor: target_anchor,
                }) => self.finish_connection(source, anchor, id, target_anchor),
                // A press on a card body or handle leaves the string live.
                Some(_) => Effect::none(),
                None => self.cancel_gesture(),
            },
            // A gesture is already running; a second press is a no-op.
            _ => Effect::none(),
        }
    }

    /// Second click of the two-click connect gesture. Self-loops are
    /// discarded; duplicates fall through `connect` and change nothing.
    /// Either way the preview and anchor highlights go away.
    fn finish_connection(
        &mut self,
        source: ItemId,
        source_anchor: Anchor,
        target: ItemId,
        target_anchor: Anchor,
    ) -> Effect {
        self.mode = Mode::Idle;
        if target == source {
            log::debug!("string to itself discarded ({source})");
            return Effect::redraw();
        }
        let mut effect = self.apply(BoardMutation::AddConnection {
            from: source,
            to: target,
            from_anchor: source_anchor,
            to_anchor: target_anchor,
        });
        effect.changed = true;
        effect
    }

    fn pointer_move(&mut self, x: f64, y: f64) -> Effect {
        let p = self.viewport.screen_to_board(Point::new(x, y));
        self.pointer_board = p;

        match self.mode {
            Mode::Dragging { id, grab_dx, grab_dy } => self.apply(BoardMutation::MoveItem {
                id,
                x: p.x - grab_dx,
                y: p.y - grab_dy,
            }),
            Mode::Resizing {
                id,
                origin_x,
                origin_y,
                start_width,
                start_height,
            } => self.apply(BoardMutation::ResizeItem {
                id,
                width: start_width + (p.x - origin_x),
                height: start_height + (p.y - origin_y),
            }),
            Mode::Connecting { .. } => Effect::redraw(),
            Mode::Panning { last_x, last_y } => {
                self.viewport.pan_by(x - last_x, y - last_y);
                self.mode = Mode::Panning {
                    last_x: x,
                    last_y: y,
                };
                Effect::redraw()
            }
            Mode::Idle => Effect::none(),
        }
    }

    fn pointer_up(&mut self) -> Effect {
        match self.mode {
            // Drag and resize persist once, on release, not per frame.
            Mode::Dragging { .. } | Mode::Resizing { .. } => {
                self.mode = Mode::Idle;
                Effect::saved()
            }
            Mode::Panning { .. } => {
                self.mode = Mode::Idle;
                Effect::none()
            }
            // A string stays live across release; only a click lands it.
            Mode::Connecting { .. } | Mode::Idle => Effect::none(),
        }
    }

    fn key_down(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> Effect {
        match ShortcutMap::resolve(key, ctrl, shift, alt, meta) {
            Some(ShortcutAction::CancelMode) => self.cancel_gesture(),
            Some(ShortcutAction::ZoomIn) => {
                self.viewport.zoom_in();
                Effect::redraw()
            }
            Some(ShortcutAction::ZoomOut) => {
                self.viewport.zoom_out();
                Effect::redraw()
            }
            Some(ShortcutAction::ZoomReset) => {
                self.viewport.reset_to_fit(self.board.width, self.board.height);
                Effect::redraw()
            }
            None => Effect::none(),
        }
    }

    /// Start a string from a card's connect button rather than a dot
    /// click. Restarts from the new source if one was already live.
    pub fn start_connection(&mut self, id: ItemId, anchor: Anchor) -> Effect {
        if !self.board.contains(id) {
            return Effect::none();
        }
        self.mode = Mode::Connecting { source: id, anchor };
        Effect::redraw()
    }

    /// Escape or empty-space click: back to idle, dropping the string
    /// preview and any anchor highlights with the mode.
    pub fn cancel_gesture(&mut self) -> Effect {
        if self.mode.is_idle() {
            return Effect::none();
        }
        log::debug!("{} cancelled", self.mode.name());
        self.mode = Mode::Idle;
        Effect::redraw()
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply one mutation to the board. This is the only place board
    /// state changes; pointer gestures and the toolbar both end here.
    pub fn apply(&mut self, mutation: BoardMutation) -> Effect {
        match mutation {
            BoardMutation::AddNote { x, y, note_type } => {
                let id = self.board.alloc_id();
                self.board.add_item(Item::new_note(id, x, y, note_type));
                self.board.move_item(id, x, y);
                Effect::saved().with_created(id)
            }
            BoardMutation::AddMedia {
                x,
                y,
                media_data_url,
            } => {
                let id = self.board.alloc_id();
                self.board.add_item(Item::new_media(id, x, y, media_data_url));
                self.board.move_item(id, x, y);
                Effect::saved().with_created(id)
            }
            BoardMutation::MoveItem { id, x, y } => {
                if self.board.move_item(id, x, y) {
                    Effect::redraw()
                } else {
                    Effect::none()
                }
            }
            BoardMutation::ResizeItem { id, width, height } => {
                if self.board.resize_item(id, width, height) {
                    Effect::redraw()
                } else {
                    Effect::none()
                }
            }
            BoardMutation::EditNote {
                id,
                title,
                content,
                note_type,
                color,
            } => {
                let Some(item) = self.board.get_by_id_mut(id) else {
                    return Effect::none();
                };
                let cb_core::model::ItemKind::Note {
                    title: t,
                    content: c,
                    note_type: nt,
                    color: col,
                } = &mut item.kind
                else {
                    return Effect::none();
                };
                *t = title;
                *c = content;
                *nt = note_type;
                *col = color;
                Effect::saved()
            }
            BoardMutation::SetAspectRatio { id, ratio } => {
                let Some(item) = self.board.get_by_id_mut(id) else {
                    return Effect::none();
                };
                if item.set_aspect_ratio(ratio) {
                    Effect::saved()
                } else {
                    Effect::none()
                }
            }
            BoardMutation::SetHighlighter { id, data } => {
                let Some(item) = self.board.get_by_id_mut(id) else {
                    return Effect::none();
                };
                let cb_core::model::ItemKind::Media {
                    highlighter_data, ..
                } = &mut item.kind
                else {
                    return Effect::none();
                };
                *highlighter_data = data;
                Effect::saved()
            }
            BoardMutation::RemoveItem { id } => {
                if self.board.remove_item(id).is_none() {
                    return Effect::none();
                }
                if self.mode.involves(id) {
                    self.mode = Mode::Idle;
                }
                Effect::saved()
            }
            BoardMutation::AddConnection {
                from,
                to,
                from_anchor,
                to_anchor,
            } => {
                if self.board.connect(from, to, from_anchor, to_anchor) {
                    Effect::saved()
                } else {
                    Effect::none()
                }
            }
            BoardMutation::ClearConnections => {
                self.board.clear_connections();
                Effect::saved()
            }
            BoardMutation::ClearItems => {
                self.board.clear_items();
                self.mode = Mode::Idle;
                Effect::saved()
            }
            BoardMutation::SetBoardSize { width, height } => {
                if self.board.set_extent(width, height) {
                    Effect::saved()
                } else {
                    log::warn!("board size {width}x{height} out of range, keeping current");
                    Effect::rejected()
                }
            }
        }
    }

    // ─── Placement ───────────────────────────────────────────────────────

    /// Add a note at a random spot away from the board edges. The unit
    /// randoms come from the caller so placement stays testable.
    pub fn add_note_at_random(&mut self, note_type: NoteType, rx: f64, ry: f64) -> Effect {
        let x = rx * (self.board.width - 250.0) + SPAWN_MARGIN;
        let y = ry * (self.board.height - 200.0) + SPAWN_MARGIN;
        self.apply(BoardMutation::AddNote { x, y, note_type })
    }

    /// Add a media item at a random spot, leaving room for its wider
    /// default footprint.
    pub fn add_media_at_random(&mut self, media_data_url: String, rx: f64, ry: f64) -> Effect {
        let x = rx * (self.board.width - MEDIA_DEFAULT_WIDTH - 50.0) + SPAWN_MARGIN;
        let y = ry * (self.board.height - MEDIA_DEFAULT_WIDTH) + SPAWN_MARGIN;
        self.apply(BoardMutation::AddMedia {
            x,
            y,
            media_data_url,
        })
    }
}
