//! WASM bridge for the corkboard: exposes the Rust board engine to
//! JavaScript.
//!
//! Compiled via `wasm-pack build --target web` and loaded by the board
//! shell, which owns the DOM chrome (toolbars, dialogs, file pickers)
//! and forwards canvas events here.

mod export;
mod images;
mod render2d;
mod storage;

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use cb_core::board::Board;
use cb_core::model::{Anchor, Color, ItemId, ItemKind, NoteType};
use cb_core::store::{BoardId, BoardStore, Prefs};
use cb_editor::engine::EditorEngine;
use cb_editor::input::InputEvent;
use cb_editor::mutation::{BoardMutation, Effect};
use cb_render::theme::BoardTheme;

use images::ImageCache;
use storage::LocalStorage;

/// Redraw period of the drag ticker, ms.
const DRAG_TICK_MS: u32 = 50;

struct Inner {
    engine: EditorEngine,
    store: BoardStore<LocalStorage>,
    active: BoardId,
    images: ImageCache,
    dark_mode: bool,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Inner {
    fn theme(&self) -> BoardTheme {
        if self.dark_mode {
            BoardTheme::dark()
        } else {
            BoardTheme::light()
        }
    }

    /// Kick off decoding for every media image the board references.
    fn sync_images(&mut self) {
        for item in self.engine.board.items() {
            if let ItemKind::Media {
                media_data_url,
                highlighter_data,
                ..
            } = &item.kind
            {
                self.images.ensure_base(item.id, media_data_url);
                if let Some(data) = highlighter_data {
                    self.images.ensure_overlay(item.id, data);
                }
            }
        }
    }

    /// Fold freshly decoded aspect ratios back into the board.
    fn drain_decoded(&mut self) {
        for (id, ratio) in self.images.take_decoded() {
            let effect = self.engine.apply(BoardMutation::SetAspectRatio { id, ratio });
            if effect.persist {
                self.save_active();
            }
        }
    }

    fn render(&mut self) {
        self.drain_decoded();
        let theme = self.theme();
        render2d::render_scene(
            &self.ctx,
            &self.engine.board,
            &self.engine.viewport,
            &theme,
            &self.images,
            self.engine.mode().dragged_item(),
            self.engine.mode().is_connecting(),
            self.engine.connection_preview(),
            self.engine.strings_visible(),
        );
    }

    fn save_active(&mut self) {
        let snapshot = self.engine.board.to_snapshot(now_iso());
        self.store.save(self.active, &snapshot);
    }

    /// Act on an engine effect: persist, repaint, report change.
    fn finish(&mut self, effect: Effect) -> bool {
        if effect.persist {
            self.save_active();
        }
        if effect.changed {
            self.render();
        }
        effect.changed
    }
}

/// The WASM-facing board controller.
///
/// Holds the editor engine, the persistence store, and the image cache.
/// All interaction from the shell JS goes through this struct.
#[wasm_bindgen]
pub struct CorkboardCanvas {
    inner: Rc<RefCell<Inner>>,
    /// Repaints on a fixed clock while a card drag is live, decoupling
    /// paint rate from pointer event rate.
    drag_ticker: Option<Interval>,
}

#[wasm_bindgen]
impl CorkboardCanvas {
    /// Create a controller bound to a canvas element. Loads the active
    /// board (or an empty one) and paints the first frame.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<CorkboardCanvas, JsValue> {
        console_error_panic_hook_setup();
        init_console_logging();

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into()?;

        let store = BoardStore::new(LocalStorage::new());
        let active = store.active_board().unwrap_or(BoardId::FIRST);
        let mut engine = EditorEngine::new(f64::from(canvas.width()), f64::from(canvas.height()));
        engine.open_snapshot(&store.load(active));

        let mut inner = Inner {
            engine,
            store,
            active,
            images: ImageCache::new(),
            dark_mode: false,
            canvas,
            ctx,
        };
        inner.sync_images();
        inner.render();

        Ok(Self {
            inner: Rc::new(RefCell::new(inner)),
            drag_ticker: None,
        })
    }

    /// Resize the canvas backing store and refit nothing: zoom and pan
    /// are kept, only the visible area changes.
    pub fn resize_surface(&mut self, width: f64, height: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.canvas.set_width(width as u32);
        inner.canvas.set_height(height as u32);
        inner.engine.viewport.set_screen_size(width, height);
        inner.render();
    }

    /// Repaint the scene.
    pub fn render(&mut self) {
        self.inner.borrow_mut().render();
    }

    /// Light/dark palette switch.
    pub fn set_theme(&mut self, is_dark: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.dark_mode = is_dark;
        inner.render();
    }

    // ─── Pointer and keyboard ────────────────────────────────────────────

    /// Handle pointer down. Returns true if state changed.
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let effect = inner
                .engine
                .handle_event(&InputEvent::from_pointer_down(x, y, button));
            inner.finish(effect)
        };
        self.sync_drag_ticker();
        changed
    }

    /// Handle pointer move. Drag frames mutate the board but leave the
    /// repaint to the drag ticker.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let mut inner = self.inner.borrow_mut();
        let effect = inner
            .engine
            .handle_event(&InputEvent::from_pointer_move(x, y));
        if effect.persist {
            inner.save_active();
        }
        let throttled = inner.engine.mode().dragged_item().is_some();
        if effect.changed && !throttled {
            inner.render();
        }
        effect.changed
    }

    /// Handle pointer up. Ends drags and resizes, persisting once.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let effect = inner.engine.handle_event(&InputEvent::from_pointer_up(x, y));
            inner.finish(effect)
        };
        self.sync_drag_ticker();
        changed
    }

    /// Handle a wheel event, zooming toward the pointer.
    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        let mut inner = self.inner.borrow_mut();
        let effect = inner.engine.handle_event(&InputEvent::Wheel { x, y, delta_y });
        inner.finish(effect)
    }

    /// Handle a keyboard event (`KeyboardEvent.key` plus modifiers).
    pub fn key_down(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let effect = inner.engine.handle_event(&InputEvent::Key {
                key: key.to_string(),
                ctrl,
                shift,
                alt,
                meta,
            });
            inner.finish(effect)
        };
        self.sync_drag_ticker();
        changed
    }

    // ─── Items ───────────────────────────────────────────────────────────

    /// Pin a new note of the given type at a random free-ish spot.
    /// Returns its id.
    pub fn add_note(&mut self, note_type: &str) -> Option<u32> {
        let mut inner = self.inner.borrow_mut();
        let kind = NoteType::parse(note_type).unwrap_or(NoteType::Concept);
        let effect =
            inner
                .engine
                .add_note_at_random(kind, js_sys::Math::random(), js_sys::Math::random());
        let id = effect.created.map(|id| id.0);
        inner.finish(effect);
        id
    }

    /// Pin an image (as a data URL). The height settles once the image
    /// decodes and reports its aspect ratio.
    pub fn add_media(&mut self, data_url: &str) -> Option<u32> {
        let mut inner = self.inner.borrow_mut();
        let effect = inner.engine.add_media_at_random(
            data_url.to_string(),
            js_sys::Math::random(),
            js_sys::Math::random(),
        );
        let id = effect.created.map(|id| id.0);
        if let Some(id) = effect.created {
            inner.images.ensure_base(id, data_url);
        }
        inner.finish(effect);
        id
    }

    /// Delete an item and every string tied to it.
    pub fn delete_item(&mut self, id: u32) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let effect = inner.engine.apply(BoardMutation::RemoveItem { id: ItemId(id) });
            inner.images.remove(ItemId(id));
            inner.finish(effect)
        };
        self.sync_drag_ticker();
        changed
    }

    /// Note fields for the edit dialog, as JSON (`null` for anything
    /// that is not a note).
    pub fn note_props(&self, id: u32) -> String {
        let inner = self.inner.borrow();
        let Some(item) = inner.engine.board.get_by_id(ItemId(id)) else {
            return "null".to_string();
        };
        let ItemKind::Note {
            title,
            content,
            note_type,
            color,
        } = &item.kind
        else {
            return "null".to_string();
        };
        let props = NoteProps {
            id,
            title,
            content,
            note_type: note_type.as_str(),
            color: color.to_hex(),
        };
        serde_json::to_string(&props).unwrap_or_else(|_| "null".to_string())
    }

    /// Apply the edit dialog's result to a note.
    pub fn apply_note_edit(
        &mut self,
        id: u32,
        title: &str,
        content: &str,
        note_type: &str,
        color: &str,
    ) -> bool {
        let mut inner = self.inner.borrow_mut();
        let kind = NoteType::parse(note_type).unwrap_or(NoteType::Concept);
        let color = Color::from_hex(color).unwrap_or_else(|| kind.default_color());
        let effect = inner.engine.apply(BoardMutation::EditNote {
            id: ItemId(id),
            title: title.to_string(),
            content: content.to_string(),
            note_type: kind,
            color,
        });
        inner.finish(effect)
    }

    /// Attach (or clear) a highlighter overlay on a media item.
    pub fn set_highlighter_data(&mut self, id: u32, data: Option<String>) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.images.drop_overlay(ItemId(id));
        if let Some(url) = &data {
            inner.images.ensure_overlay(ItemId(id), url);
        }
        let effect = inner
            .engine
            .apply(BoardMutation::SetHighlighter { id: ItemId(id), data });
        inner.finish(effect)
    }

    /// Start a string from a card's connect button (top anchor).
    pub fn start_connection_from(&mut self, id: u32) -> bool {
        let mut inner = self.inner.borrow_mut();
        let effect = inner.engine.start_connection(ItemId(id), Anchor::Top);
        inner.finish(effect)
    }

    // ─── Boards ──────────────────────────────────────────────────────────

    /// Persist the open board into its slot.
    pub fn save_board(&mut self) {
        self.inner.borrow_mut().save_active();
    }

    /// Open a slot without saving the outgoing board.
    pub fn load_board(&mut self, slot: u8) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(target) = BoardId::new(slot) else {
            return false;
        };
        inner.active = target;
        inner.store.set_active_board(target);
        let snapshot = inner.store.load(target);
        inner.engine.open_snapshot(&snapshot);
        inner.images.clear();
        inner.sync_images();
        inner.render();
        true
    }

    /// Save the open board, then open another slot.
    pub fn switch_board(&mut self, slot: u8) -> bool {
        if BoardId::new(slot).is_none() {
            return false;
        }
        self.inner.borrow_mut().save_active();
        self.load_board(slot)
    }

    /// All slots with name, timestamp, and empty flag, as JSON.
    pub fn list_boards(&self) -> String {
        let inner = self.inner.borrow();
        serde_json::to_string(&inner.store.list_all()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn rename_board(&mut self, slot: u8, name: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(target) = BoardId::new(slot) else {
            return false;
        };
        inner.store.rename(target, name);
        true
    }

    /// Drop a slot's snapshot, metadata, and preview. Clears the view
    /// when the open board is the one deleted.
    pub fn delete_board(&mut self, slot: u8) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(target) = BoardId::new(slot) else {
            return false;
        };
        inner.store.delete(target);
        if target == inner.active {
            inner.engine.open_board(Board::new());
            inner.images.clear();
            inner.render();
        }
        true
    }

    /// Save the open board and start a fresh one in the first empty
    /// slot. Returns the new slot number.
    pub fn create_board(&mut self) -> u8 {
        let mut inner = self.inner.borrow_mut();
        inner.save_active();
        let slot = inner.store.create_in_first_empty_slot();
        inner.active = slot;
        inner.store.set_active_board(slot);
        inner.engine.open_board(Board::new());
        inner.images.clear();
        inner.save_active();
        inner.render();
        slot.get()
    }

    /// Slot number of the open board.
    pub fn active_board(&self) -> u8 {
        self.inner.borrow().active.get()
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.engine.viewport.zoom_in();
        inner.render();
    }

    pub fn zoom_out(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.engine.viewport.zoom_out();
        inner.render();
    }

    /// Fit the whole board back into the canvas.
    pub fn reset_zoom(&mut self) {
        let mut inner = self.inner.borrow_mut();
        let (bw, bh) = (inner.engine.board.width, inner.engine.board.height);
        inner.engine.viewport.reset_to_fit(bw, bh);
        inner.render();
    }

    pub fn zoom_level(&self) -> f64 {
        self.inner.borrow().engine.viewport.zoom
    }

    // ─── Board surface ───────────────────────────────────────────────────

    /// Resize the board extent. False when the size is out of range;
    /// the board is left untouched.
    pub fn set_board_size(&mut self, width: f64, height: f64) -> bool {
        let mut inner = self.inner.borrow_mut();
        let effect = inner
            .engine
            .apply(BoardMutation::SetBoardSize { width, height });
        inner.finish(effect);
        !effect.rejected
    }

    /// Hide or show every string. Returns the new visibility.
    pub fn toggle_strings(&mut self) -> bool {
        let mut inner = self.inner.borrow_mut();
        let visible = inner.engine.toggle_strings();
        inner.render();
        visible
    }

    /// Cut every string, keeping the items.
    pub fn clear_strings(&mut self) -> bool {
        let mut inner = self.inner.borrow_mut();
        let effect = inner.engine.apply(BoardMutation::ClearConnections);
        inner.finish(effect)
    }

    /// Clear the whole board.
    pub fn clear_board(&mut self) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let effect = inner.engine.apply(BoardMutation::ClearItems);
            inner.images.clear();
            inner.finish(effect)
        };
        self.sync_drag_ticker();
        changed
    }

    // ─── Preferences ─────────────────────────────────────────────────────

    pub fn sidebar_collapsed(&self) -> bool {
        self.inner.borrow().store.load_prefs().sidebar_collapsed
    }

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) {
        self.inner.borrow_mut().store.save_prefs(&Prefs {
            sidebar_collapsed: collapsed,
        });
    }

    // ─── Export and preview ──────────────────────────────────────────────

    /// Download name for the open board, `{name}-{YYYY-MM-DD}.png`.
    pub fn export_filename(&self) -> String {
        let inner = self.inner.borrow();
        let name = inner
            .store
            .list_all()
            .into_iter()
            .find(|entry| entry.id == inner.active)
            .map(|entry| entry.name)
            .unwrap_or_else(|| format!("Board {}", inner.active));
        export::export_filename(&name)
    }

    /// Render the full board extent at `scale` into a PNG data URL.
    /// The on-screen viewport is untouched.
    pub fn export_image(&self, scale: f64) -> Result<String, JsValue> {
        let inner = self.inner.borrow();
        let theme = inner.theme();
        export::render_board_to_data_url(
            &inner.engine.board,
            &inner.images,
            &theme,
            inner.engine.strings_visible(),
            scale,
        )
    }

    /// Capture a small preview of the open board into its slot's
    /// preview key, waiting (bounded) for images still decoding.
    pub fn update_preview(&self) {
        let inner = Rc::clone(&self.inner);
        wasm_bindgen_futures::spawn_local(async move {
            let ids = {
                let inner = inner.borrow();
                export::media_item_ids(&inner.engine.board)
            };
            let probe = {
                let inner = Rc::clone(&inner);
                let ids = ids.clone();
                move || {
                    let inner = inner.borrow();
                    let pending = ids.iter().any(|id| inner.images.is_pending(*id));
                    (ids.len(), pending)
                }
            };
            export::wait_for_media(probe).await;

            let mut inner = inner.borrow_mut();
            let theme = inner.theme();
            let captured = export::render_board_to_data_url(
                &inner.engine.board,
                &inner.images,
                &theme,
                inner.engine.strings_visible(),
                export::PREVIEW_SCALE,
            );
            match captured {
                Ok(url) => {
                    let active = inner.active;
                    inner.store.save_preview(active, &url);
                }
                Err(err) => log::error!("preview capture failed: {err:?}"),
            }
        });
    }

    /// Stored preview for a slot, if one was captured.
    pub fn board_preview(&self, slot: u8) -> Option<String> {
        let inner = self.inner.borrow();
        BoardId::new(slot).and_then(|id| inner.store.load_preview(id))
    }
}

impl CorkboardCanvas {
    /// Keep the drag ticker running exactly while a drag is live.
    fn sync_drag_ticker(&mut self) {
        let dragging = self.inner.borrow().engine.mode().dragged_item().is_some();
        match (dragging, self.drag_ticker.is_some()) {
            (true, false) => {
                let inner = Rc::clone(&self.inner);
                self.drag_ticker = Some(Interval::new(DRAG_TICK_MS, move || {
                    if let Ok(mut inner) = inner.try_borrow_mut() {
                        inner.render();
                    }
                }));
            }
            (false, true) => {
                self.drag_ticker = None;
            }
            _ => {}
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NoteProps<'a> {
    id: u32,
    title: &'a str,
    content: &'a str,
    #[serde(rename = "type")]
    note_type: &'a str,
    color: String,
}

fn now_iso() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("corkboard WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Console logging ─────────────────────────────────────────────────────

fn init_console_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;

        struct ConsoleLogger;

        impl log::Log for ConsoleLogger {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                metadata.level() <= log::Level::Debug
            }

            fn log(&self, record: &log::Record) {
                if !self.enabled(record.metadata()) {
                    return;
                }
                let msg = format!("[{}] {}", record.target(), record.args());
                match record.level() {
                    log::Level::Error => web_sys::console::error_1(&JsValue::from_str(&msg)),
                    log::Level::Warn => web_sys::console::warn_1(&JsValue::from_str(&msg)),
                    _ => web_sys::console::log_1(&JsValue::from_str(&msg)),
                }
            }

            fn flush(&self) {}
        }

        static LOGGER: ConsoleLogger = ConsoleLogger;
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(log::LevelFilter::Debug);
            }
        });
    }
}
