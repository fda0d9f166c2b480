//! Core data model for corkboard boards.
//!
//! A board is a free-placement surface: items (notes and media) carry
//! absolute board-space positions, and red strings tie pairs of items
//! together at named edge anchors. There is no layout solver; positions
//! are exactly what the user dragged them to. `ItemId`s come from a
//! persisted per-board counter and are never reused within a board's
//! lifetime.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────

/// Numeric item identifier, unique across notes and media within one board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Colors ──────────────────────────────────────────────────────────────

/// Opaque sRGB color, stored as 3 × u8. Serialized as a `#rrggbb` hex
/// string to match the stored board format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string: `#RGB` or `#RRGGBB`. The leading `#` is
    /// optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                Some(Self::rgb(r, g, b))
            }
            _ => None,
        }
    }

    /// Emit as `#rrggbb` (lowercase, the form the stored format uses).
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived brightness in [0, 255] (ITU-R BT.601 luma weights).
    pub fn brightness(&self) -> f64 {
        (self.r as f64 * 299.0 + self.g as f64 * 587.0 + self.b as f64 * 114.0) / 1000.0
    }

    /// Cards darker than mid-gray get light text.
    pub fn needs_light_text(&self) -> bool {
        self.brightness() < 128.0
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color: {s:?}")))
    }
}

// ─── Anchors ─────────────────────────────────────────────────────────────

/// Named edge-midpoint of an item's bounding box, used as a string
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [Anchor::Top, Anchor::Bottom, Anchor::Left, Anchor::Right];

    /// Parse the lowercase anchor names used by the stored format.
    /// Anything else is unrecognized and resolves to the item center.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Anchor::Top),
            "bottom" => Some(Anchor::Bottom),
            "left" => Some(Anchor::Left),
            "right" => Some(Anchor::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Bottom => "bottom",
            Anchor::Left => "left",
            Anchor::Right => "right",
        }
    }
}

// ─── Connections ─────────────────────────────────────────────────────────

/// One red string tying two items together. Undirected in meaning: the
/// `from`/`to` split only records which end was picked first, and the
/// anchors bind to their respective items. Wire names (`fromPos`/`toPos`)
/// match the stored board format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: ItemId,
    pub to: ItemId,
    #[serde(rename = "fromPos")]
    pub from_anchor: Anchor,
    #[serde(rename = "toPos")]
    pub to_anchor: Anchor,
}

impl Connection {
    /// True if this string touches the given item at either end.
    pub fn touches(&self, id: ItemId) -> bool {
        self.from == id || self.to == id
    }

    /// True if this string ties the same unordered pair.
    pub fn same_pair(&self, a: ItemId, b: ItemId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

// ─── Note types ──────────────────────────────────────────────────────────

/// Category of a note. Each type carries a default pin color and an icon
/// shown in the card header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Concept,
    Fact,
    Question,
    Theory,
}

impl NoteType {
    pub fn default_color(&self) -> Color {
        match self {
            NoteType::Concept => Color::rgb(0xff, 0xeb, 0x3b),
            NoteType::Fact => Color::rgb(0x81, 0xc7, 0x84),
            NoteType::Question => Color::rgb(0x64, 0xb5, 0xf6),
            NoteType::Theory => Color::rgb(0xba, 0x68, 0xc8),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NoteType::Concept => "🎯",
            NoteType::Fact => "📋",
            NoteType::Question => "❓",
            NoteType::Theory => "🔬",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "concept" => Some(NoteType::Concept),
            "fact" => Some(NoteType::Fact),
            "question" => Some(NoteType::Question),
            "theory" => Some(NoteType::Theory),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Concept => "concept",
            NoteType::Fact => "fact",
            NoteType::Question => "question",
            NoteType::Theory => "theory",
        }
    }
}

// ─── Items ───────────────────────────────────────────────────────────────

pub const NOTE_DEFAULT_WIDTH: f64 = 200.0;
pub const NOTE_DEFAULT_HEIGHT: f64 = 150.0;
pub const NOTE_MIN_WIDTH: f64 = 150.0;
pub const NOTE_MAX_WIDTH: f64 = 600.0;
pub const NOTE_MIN_HEIGHT: f64 = 100.0;
pub const NOTE_MAX_HEIGHT: f64 = 800.0;

pub const MEDIA_DEFAULT_WIDTH: f64 = 300.0;
pub const MEDIA_MIN_SIZE: f64 = 100.0;
pub const MEDIA_MAX_SIZE: f64 = 800.0;

/// A pinned board element: common placement plus a tagged kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    /// Top-left corner, board space.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub kind: ItemKind,
}

/// The two placeable entities. An explicit tag, never distinguished by
/// sniffing which fields happen to be present.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Note {
        title: String,
        /// Rich-text HTML from the external edit surface; opaque here.
        content: String,
        note_type: NoteType,
        /// Effective card color. Starts as the type color, survives a
        /// later type change once the user overrides it.
        color: Color,
    },
    Media {
        /// Embedded image payload (data URL).
        media_data_url: String,
        /// natural width / natural height, known once the image decodes.
        aspect_ratio: Option<f64>,
        /// Serialized annotation overlay (data URL), if any.
        highlighter_data: Option<String>,
    },
}

impl Item {
    pub fn new_note(id: ItemId, x: f64, y: f64, note_type: NoteType) -> Self {
        Self {
            id,
            x,
            y,
            width: NOTE_DEFAULT_WIDTH,
            height: NOTE_DEFAULT_HEIGHT,
            kind: ItemKind::Note {
                title: String::new(),
                content: String::new(),
                note_type,
                color: note_type.default_color(),
            },
        }
    }

    /// New media item. Height starts at a 4:3 placeholder until the image
    /// decodes and reports its aspect ratio.
    pub fn new_media(id: ItemId, x: f64, y: f64, media_data_url: String) -> Self {
        Self {
            id,
            x,
            y,
            width: MEDIA_DEFAULT_WIDTH,
            height: MEDIA_DEFAULT_WIDTH * 0.75,
            kind: ItemKind::Media {
                media_data_url,
                aspect_ratio: None,
                highlighter_data: None,
            },
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self.kind, ItemKind::Note { .. })
    }

    pub fn is_media(&self) -> bool {
        matches!(self.kind, ItemKind::Media { .. })
    }

    pub fn bounds(&self) -> ItemBounds {
        ItemBounds {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Apply a resize request, clamping to the kind's size limits. Media
    /// resizes preserve aspect ratio from the requested width.
    pub fn apply_resize(&mut self, width: f64, height: f64) {
        match &self.kind {
            ItemKind::Note { .. } => {
                self.width = width.clamp(NOTE_MIN_WIDTH, NOTE_MAX_WIDTH);
                self.height = height.clamp(NOTE_MIN_HEIGHT, NOTE_MAX_HEIGHT);
            }
            ItemKind::Media { aspect_ratio, .. } => {
                let ratio = aspect_ratio.unwrap_or(4.0 / 3.0);
                let w = width.clamp(MEDIA_MIN_SIZE, MEDIA_MAX_SIZE);
                let h = (w / ratio).clamp(MEDIA_MIN_SIZE, MEDIA_MAX_SIZE);
                self.width = w;
                self.height = h;
            }
        }
    }

    /// Record the decoded image's aspect ratio and rescale the height to
    /// match. Ignores notes and degenerate ratios; returns whether the
    /// ratio was applied.
    pub fn set_aspect_ratio(&mut self, ratio: f64) -> bool {
        if let ItemKind::Media { aspect_ratio, .. } = &mut self.kind
            && ratio.is_finite()
            && ratio > 0.0
        {
            *aspect_ratio = Some(ratio);
            self.height = (self.width / ratio).clamp(MEDIA_MIN_SIZE, MEDIA_MAX_SIZE);
            return true;
        }
        false
    }
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Axis-aligned bounding box of one item, board space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ItemBounds {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}
