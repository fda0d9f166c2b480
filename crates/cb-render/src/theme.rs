//! Theme-dependent colors for the board renderer.
//!
//! Plain CSS color strings, handed straight to the canvas context. The
//! string reds are fixed across themes; the red string is the product.

/// Stroke width of a string.
pub const STRING_WIDTH: f64 = 2.0;
/// Width of the soft glow pass drawn under each string.
pub const STRING_GLOW_WIDTH: f64 = 4.0;
/// Shadow blur applied to the main string stroke.
pub const STRING_SHADOW_BLUR: f64 = 2.0;
/// Dash pattern for the live preview string.
pub const PREVIEW_DASH: [f64; 2] = [8.0, 6.0];
/// Radius of a drawn anchor dot.
pub const ANCHOR_DOT_RADIUS: f64 = 5.0;

pub struct BoardTheme {
    /// Cork surface of the board itself.
    pub surface: &'static str,
    pub surface_edge: &'static str,
    /// Everything outside the board extent.
    pub backdrop: &'static str,
    pub string: &'static str,
    pub string_glow: &'static str,
    pub string_shadow: &'static str,
    pub card_border: &'static str,
    pub card_shadow: &'static str,
    pub text_dark: &'static str,
    pub text_light: &'static str,
    pub anchor_dot: &'static str,
    pub anchor_dot_ring: &'static str,
    /// Outline applied to every item while a connection is being drawn.
    pub connectable_halo: &'static str,
    pub resize_handle: &'static str,
    pub media_backing: &'static str,
}

impl BoardTheme {
    /// Light theme: warm cork on a neutral desk.
    pub fn light() -> Self {
        Self {
            surface: "#d2a56d",
            surface_edge: "#8b5e3c",
            backdrop: "#e8e2d8",
            string: "#c62828",
            string_glow: "rgba(198, 40, 40, 0.3)",
            string_shadow: "rgba(198, 40, 40, 0.5)",
            card_border: "rgba(0, 0, 0, 0.25)",
            card_shadow: "rgba(0, 0, 0, 0.35)",
            text_dark: "#212121",
            text_light: "#f5f5f5",
            anchor_dot: "#c62828",
            anchor_dot_ring: "#f5f5f5",
            connectable_halo: "rgba(198, 40, 40, 0.65)",
            resize_handle: "rgba(0, 0, 0, 0.35)",
            media_backing: "#ffffff",
        }
    }

    /// Dark theme: dim room, same red string.
    pub fn dark() -> Self {
        Self {
            surface: "#4a3726",
            surface_edge: "#2e2218",
            backdrop: "#1c1c1e",
            string: "#c62828",
            string_glow: "rgba(198, 40, 40, 0.3)",
            string_shadow: "rgba(198, 40, 40, 0.5)",
            card_border: "rgba(255, 255, 255, 0.18)",
            card_shadow: "rgba(0, 0, 0, 0.6)",
            text_dark: "#212121",
            text_light: "#f5f5f5",
            anchor_dot: "#e05050",
            anchor_dot_ring: "#1c1c1e",
            connectable_halo: "rgba(224, 80, 80, 0.65)",
            resize_handle: "rgba(255, 255, 255, 0.35)",
            media_backing: "#2c2c2e",
        }
    }
}
