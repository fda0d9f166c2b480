//! Canvas2D board renderer.
//!
//! Draws the whole scene (backdrop, cork surface, cards, strings,
//! preview string, anchor dots, resize grips) to an HTML `<canvas>` via
//! `CanvasRenderingContext2d`. Geometry comes from `cb-render`; this
//! module only pushes it through the context.

use cb_core::board::Board;
use cb_core::model::{Color, Item, ItemBounds, ItemId, ItemKind};
use cb_core::viewport::Viewport;
use cb_render::anchor::{anchor_points, resolve};
use cb_render::string::string_path;
use cb_render::theme::{
    ANCHOR_DOT_RADIUS, BoardTheme, PREVIEW_DASH, STRING_GLOW_WIDTH, STRING_SHADOW_BLUR,
    STRING_WIDTH,
};
use kurbo::{Point, QuadBez};
use web_sys::CanvasRenderingContext2d;

use crate::images::ImageCache;

/// Inner padding of a card.
const CARD_PAD: f64 = 10.0;
/// Height of a note card's title strip.
const TITLE_BAR_H: f64 = 30.0;
/// White photo border around a media card's image.
const MEDIA_PAD: f64 = 8.0;
const TITLE_FONT: &str = "600 14px system-ui, sans-serif";
const BODY_FONT: &str = "13px system-ui, sans-serif";
const BODY_LINE_H: f64 = 18.0;

/// Render the full scene for the given viewport.
///
/// The dragged card is lifted above everything else, strings included.
#[allow(clippy::too_many_arguments)]
pub fn render_scene(
    ctx: &CanvasRenderingContext2d,
    board: &Board,
    viewport: &Viewport,
    theme: &BoardTheme,
    images: &ImageCache,
    dragged: Option<ItemId>,
    connecting: bool,
    preview: Option<(Point, Point)>,
    strings_visible: bool,
) {
    // Desk behind the board
    ctx.set_fill_style_str(theme.backdrop);
    ctx.fill_rect(0.0, 0.0, viewport.screen_width, viewport.screen_height);

    ctx.save();
    let _ = ctx.translate(viewport.pan_x, viewport.pan_y);
    let _ = ctx.scale(viewport.zoom, viewport.zoom);

    draw_board_surface(ctx, board, theme);

    for item in board.items() {
        if Some(item.id) != dragged {
            draw_item(ctx, item, images, theme, connecting);
        }
    }

    if strings_visible {
        draw_strings(ctx, board, theme);
    }
    if let Some((from, to)) = preview {
        draw_string_curve(ctx, from, to, theme, true);
    }

    if let Some(id) = dragged
        && let Some(item) = board.get_by_id(id)
    {
        draw_item(ctx, item, images, theme, connecting);
    }

    ctx.restore();
}

fn draw_board_surface(ctx: &CanvasRenderingContext2d, board: &Board, theme: &BoardTheme) {
    ctx.set_fill_style_str(theme.surface);
    ctx.fill_rect(0.0, 0.0, board.width, board.height);
    ctx.set_stroke_style_str(theme.surface_edge);
    ctx.set_line_width(4.0);
    ctx.stroke_rect(0.0, 0.0, board.width, board.height);
}

// ─── Cards ───────────────────────────────────────────────────────────────

fn draw_item(
    ctx: &CanvasRenderingContext2d,
    item: &Item,
    images: &ImageCache,
    theme: &BoardTheme,
    connecting: bool,
) {
    let bounds = item.bounds();
    match &item.kind {
        ItemKind::Note {
            title,
            content,
            note_type,
            color,
        } => draw_note_card(ctx, &bounds, title, content, note_type.icon(), color, theme),
        ItemKind::Media { .. } => draw_media_card(ctx, item.id, &bounds, images, theme),
    }

    if connecting {
        draw_connectable_halo(ctx, &bounds, theme);
    }
    draw_anchor_dots(ctx, &bounds, theme);
    draw_resize_grip(ctx, &bounds, theme);
}

#[allow(clippy::too_many_arguments)]
fn draw_note_card(
    ctx: &CanvasRenderingContext2d,
    b: &ItemBounds,
    title: &str,
    content: &str,
    icon: &str,
    color: &Color,
    theme: &BoardTheme,
) {
    let (x, y, w, h) = (b.x, b.y, b.width, b.height);

    ctx.save();

    // Body with a lifted-paper shadow
    ctx.set_shadow_color(theme.card_shadow);
    ctx.set_shadow_blur(6.0);
    ctx.set_shadow_offset_x(2.0);
    ctx.set_shadow_offset_y(3.0);
    ctx.set_fill_style_str(&color.to_hex());
    ctx.fill_rect(x, y, w, h);
    clear_shadow(ctx);

    ctx.set_stroke_style_str(theme.card_border);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(x, y, w, h);

    // Title strip, slightly darker than the body
    ctx.set_fill_style_str("rgba(0, 0, 0, 0.12)");
    ctx.fill_rect(x, y, w, TITLE_BAR_H);

    let text_color = if color.needs_light_text() {
        theme.text_light
    } else {
        theme.text_dark
    };

    ctx.set_font(TITLE_FONT);
    ctx.set_fill_style_str(text_color);
    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    let heading = format!("{icon} {title}");
    let heading = ellipsize(ctx, &heading, w - 2.0 * CARD_PAD);
    let _ = ctx.fill_text(&heading, x + CARD_PAD, y + TITLE_BAR_H / 2.0);

    // Body text, clipped to the card
    ctx.save();
    ctx.begin_path();
    ctx.rect(
        x + CARD_PAD,
        y + TITLE_BAR_H,
        w - 2.0 * CARD_PAD,
        h - TITLE_BAR_H - CARD_PAD,
    );
    ctx.clip();
    ctx.set_font(BODY_FONT);
    ctx.set_text_baseline("top");
    let body = flatten_rich_text(content);
    let mut line_y = y + TITLE_BAR_H + 6.0;
    for line in wrap_text(ctx, &body, w - 2.0 * CARD_PAD) {
        if line_y > y + h {
            break;
        }
        let _ = ctx.fill_text(&line, x + CARD_PAD, line_y);
        line_y += BODY_LINE_H;
    }
    ctx.restore();

    ctx.restore();
}

fn draw_media_card(
    ctx: &CanvasRenderingContext2d,
    id: ItemId,
    b: &ItemBounds,
    images: &ImageCache,
    theme: &BoardTheme,
) {
    let (x, y, w, h) = (b.x, b.y, b.width, b.height);

    ctx.save();
    ctx.set_shadow_color(theme.card_shadow);
    ctx.set_shadow_blur(6.0);
    ctx.set_shadow_offset_x(2.0);
    ctx.set_shadow_offset_y(3.0);
    ctx.set_fill_style_str(theme.media_backing);
    ctx.fill_rect(x, y, w, h);
    clear_shadow(ctx);

    ctx.set_stroke_style_str(theme.card_border);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(x, y, w, h);

    let (ix, iy) = (x + MEDIA_PAD, y + MEDIA_PAD);
    let (iw, ih) = (w - 2.0 * MEDIA_PAD, h - 2.0 * MEDIA_PAD);
    if let Some(img) = images.loaded_base(id) {
        let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(img, ix, iy, iw, ih);
    } else {
        // Still decoding (or dead): neutral placeholder
        ctx.set_fill_style_str("rgba(128, 128, 128, 0.15)");
        ctx.fill_rect(ix, iy, iw, ih);
    }
    if let Some(overlay) = images.loaded_overlay(id) {
        let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(overlay, ix, iy, iw, ih);
    }

    ctx.restore();
}

// ─── Card furniture ──────────────────────────────────────────────────────

fn draw_anchor_dots(ctx: &CanvasRenderingContext2d, b: &ItemBounds, theme: &BoardTheme) {
    for (_, dot) in anchor_points(b) {
        ctx.begin_path();
        let _ = ctx.arc(dot.x, dot.y, ANCHOR_DOT_RADIUS, 0.0, std::f64::consts::TAU);
        ctx.set_fill_style_str(theme.anchor_dot);
        ctx.fill();
        ctx.set_stroke_style_str(theme.anchor_dot_ring);
        ctx.set_line_width(1.5);
        ctx.stroke();
    }
}

fn draw_resize_grip(ctx: &CanvasRenderingContext2d, b: &ItemBounds, theme: &BoardTheme) {
    let (cx, cy) = (b.x + b.width, b.y + b.height);
    ctx.save();
    ctx.set_stroke_style_str(theme.resize_handle);
    ctx.set_line_width(1.5);
    ctx.set_line_cap("round");
    for step in [4.0, 8.0, 12.0] {
        ctx.begin_path();
        ctx.move_to(cx - step, cy - 2.0);
        ctx.line_to(cx - 2.0, cy - step);
        ctx.stroke();
    }
    ctx.restore();
}

fn draw_connectable_halo(ctx: &CanvasRenderingContext2d, b: &ItemBounds, theme: &BoardTheme) {
    ctx.save();
    ctx.set_stroke_style_str(theme.connectable_halo);
    ctx.set_line_width(2.0);
    ctx.stroke_rect(b.x - 3.0, b.y - 3.0, b.width + 6.0, b.height + 6.0);
    ctx.restore();
}

// ─── Strings ─────────────────────────────────────────────────────────────

fn draw_strings(ctx: &CanvasRenderingContext2d, board: &Board, theme: &BoardTheme) {
    for conn in board.connections() {
        let Some(from) = board.get_by_id(conn.from) else {
            continue;
        };
        let Some(to) = board.get_by_id(conn.to) else {
            continue;
        };
        let p1 = resolve(&from.bounds(), Some(conn.from_anchor));
        let p2 = resolve(&to.bounds(), Some(conn.to_anchor));
        draw_string_curve(ctx, p1, p2, theme, false);
    }
}

/// One red string. The dashed variant is the live preview.
fn draw_string_curve(
    ctx: &CanvasRenderingContext2d,
    p1: Point,
    p2: Point,
    theme: &BoardTheme,
    dashed: bool,
) {
    let q = string_path(p1, p2);

    ctx.save();
    if dashed {
        let _ = ctx.set_line_dash(&js_sys::Array::of2(
            &wasm_bindgen::JsValue::from_f64(PREVIEW_DASH[0]),
            &wasm_bindgen::JsValue::from_f64(PREVIEW_DASH[1]),
        ));
    }
    ctx.set_line_cap("round");

    // Soft glow pass under the string
    ctx.set_stroke_style_str(theme.string_glow);
    ctx.set_line_width(STRING_GLOW_WIDTH);
    trace_quad(ctx, &q);
    ctx.stroke();

    // Main pass with its drop shadow
    ctx.set_shadow_color(theme.string_shadow);
    ctx.set_shadow_blur(STRING_SHADOW_BLUR);
    ctx.set_stroke_style_str(theme.string);
    ctx.set_line_width(STRING_WIDTH);
    trace_quad(ctx, &q);
    ctx.stroke();

    ctx.restore();
}

fn trace_quad(ctx: &CanvasRenderingContext2d, q: &QuadBez) {
    ctx.begin_path();
    ctx.move_to(q.p0.x, q.p0.y);
    ctx.quadratic_curve_to(q.p1.x, q.p1.y, q.p2.x, q.p2.y);
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Shorten to fit `max_width`, appending an ellipsis when cut.
fn ellipsize(ctx: &CanvasRenderingContext2d, text: &str, max_width: f64) -> String {
    let fits = |s: &str| {
        ctx.measure_text(s)
            .map(|m| m.width() <= max_width)
            .unwrap_or(true)
    };
    if fits(text) {
        return text.to_string();
    }
    let mut kept: String = text.to_string();
    while kept.pop().is_some() {
        let candidate = format!("{}…", kept.trim_end());
        if fits(&candidate) {
            return candidate;
        }
    }
    String::new()
}

/// Reduce stored rich text to drawable plain text. Note bodies come
/// from a contenteditable surface as HTML; the canvas draws plain runs,
/// so tags are dropped and the block-level breaks become newlines.
fn flatten_rich_text(content: &str) -> String {
    let content = content
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
        .replace("</div>", "\n")
        .replace("</p>", "\n");

    let mut out = String::with_capacity(content.len());
    let mut in_tag = false;
    for c in content.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    // `&amp;` last, so an escaped `&amp;lt;` decodes once, not twice
    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Greedy word wrap against the current context font. Blank source
/// lines survive as blank output lines.
fn wrap_text(ctx: &CanvasRenderingContext2d, text: &str, max_width: f64) -> Vec<String> {
    let fits = |s: &str| {
        ctx.measure_text(s)
            .map(|m| m.width() <= max_width)
            .unwrap_or(true)
    };
    let mut lines = Vec::new();
    for para in text.lines() {
        let mut line = String::new();
        for word in para.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if fits(&candidate) {
                line = candidate;
            } else {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                line = word.to_string();
            }
        }
        lines.push(line);
    }
    lines
}

/// Clear shadow state so later strokes don't inherit it.
fn clear_shadow(ctx: &CanvasRenderingContext2d) {
    ctx.set_shadow_blur(0.0);
    ctx.set_shadow_offset_x(0.0);
    ctx.set_shadow_offset_y(0.0);
    ctx.set_shadow_color("transparent");
}

#[cfg(test)]
mod tests {
    use super::flatten_rich_text;
    use pretty_assertions::assert_eq;

    #[test]
    fn flattening_drops_tags_and_keeps_breaks() {
        assert_eq!(
            flatten_rich_text("<div>Follow the <b>money</b></div><div>Always.</div>"),
            "Follow the money\nAlways.\n"
        );
        assert_eq!(flatten_rich_text("one<br>two"), "one\ntwo");
    }

    #[test]
    fn flattening_decodes_entities_once() {
        assert_eq!(flatten_rich_text("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(flatten_rich_text("a &lt; b"), "a < b");
        // An escaped entity stays an entity
        assert_eq!(flatten_rich_text("&amp;lt;"), "&lt;");
        assert_eq!(flatten_rich_text("no&nbsp;break"), "no break");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(flatten_rich_text("just words"), "just words");
        assert_eq!(flatten_rich_text(""), "");
    }
}
