//! PNG export and slot preview capture.
//!
//! Both paths render the full board extent into a fresh offscreen
//! canvas with its own viewport, so the on-screen transform is never
//! touched, let alone restored. Preview capture first waits (bounded)
//! for in-flight images, since a preview of gray placeholders is
//! useless.

use cb_core::board::Board;
use cb_core::model::ItemKind;
use cb_core::viewport::Viewport;
use cb_render::theme::BoardTheme;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::images::ImageCache;
use crate::render2d;

/// Scale used for slot preview thumbnails.
pub const PREVIEW_SCALE: f64 = 0.2;
/// Longest wait for a single in-flight image.
const PER_IMAGE_WAIT_MS: f64 = 2000.0;
/// Longest total wait before capturing anyway.
const TOTAL_WAIT_MS: f64 = 3000.0;
/// Poll step while waiting for images to settle.
const WAIT_POLL_MS: u32 = 50;

/// Render the whole board into an offscreen canvas at `scale` and
/// return it as a PNG data URL.
pub fn render_board_to_data_url(
    board: &Board,
    images: &ImageCache,
    theme: &BoardTheme,
    strings_visible: bool,
    scale: f64,
) -> Result<String, JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width((board.width * scale).ceil() as u32);
    canvas.set_height((board.height * scale).ceil() as u32);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    // A viewport of its own: zoomed to scale, no pan
    let mut view = Viewport::new(board.width * scale, board.height * scale);
    view.zoom = scale;

    render2d::render_scene(
        &ctx,
        board,
        &view,
        theme,
        images,
        None,
        false,
        None,
        strings_visible,
    );
    canvas.to_data_url_with_type("image/png")
}

/// Wait until no media image on the board is still decoding, bounded by
/// 2 s per image and 3 s overall.
pub async fn wait_for_media(probe: impl Fn() -> (usize, bool)) {
    let (image_count, _) = probe();
    if image_count == 0 {
        return;
    }
    let budget = TOTAL_WAIT_MS.min(PER_IMAGE_WAIT_MS * image_count as f64);
    let start = js_sys::Date::now();
    loop {
        let (_, any_pending) = probe();
        if !any_pending {
            return;
        }
        if js_sys::Date::now() - start >= budget {
            log::warn!("preview capture: image wait timed out");
            return;
        }
        TimeoutFuture::new(WAIT_POLL_MS).await;
    }
}

/// Ids of the media items on a board, for the wait probe.
pub fn media_item_ids(board: &Board) -> Vec<cb_core::model::ItemId> {
    board
        .items()
        .into_iter()
        .filter(|item| matches!(item.kind, ItemKind::Media { .. }))
        .map(|item| item.id)
        .collect()
}

/// Download name for an exported board: sanitized name plus today's
/// date, `{name}-{YYYY-MM-DD}.png`.
pub fn export_filename(board_name: &str) -> String {
    let date = js_sys::Date::new_0();
    let year = date.get_full_year();
    let month = date.get_month() + 1;
    let day = date.get_date();
    format!(
        "{}-{year:04}-{month:02}-{day:02}.png",
        sanitize_filename(board_name)
    )
}

/// Lowercase, with every run of non-alphanumerics collapsed to one `-`.
fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut gap = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if gap && !out.is_empty() {
                out.push('-');
            }
            gap = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }
    if out.is_empty() { "board".into() } else { out }
}
