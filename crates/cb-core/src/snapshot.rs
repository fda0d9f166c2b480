//! Serialized board state: the unit the persistence store reads and
//! writes.
//!
//! Field names are the stored JSON format's camelCase names; `serde`
//! defaults keep decoding tolerant of payloads written before a field
//! existed (older boards carry no extent, for example). The runtime
//! `Board` graph is rebuilt from the flat arrays on the way in.

use crate::board::{BOARD_DEFAULT_HEIGHT, BOARD_DEFAULT_WIDTH, Board};
use crate::model::{Color, Connection, Item, ItemId, ItemKind, NoteType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub notes: Vec<NoteRecord>,
    #[serde(default)]
    pub media: Vec<MediaRecord>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub note_id_counter: u32,
    #[serde(default = "default_board_width")]
    pub board_width: f64,
    #[serde(default = "default_board_height")]
    pub board_height: f64,
    /// ISO 8601, set by the caller at save time.
    #[serde(default)]
    pub last_modified: String,
}

fn default_board_width() -> f64 {
    BOARD_DEFAULT_WIDTH
}

fn default_board_height() -> f64 {
    BOARD_DEFAULT_HEIGHT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: ItemId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: ItemId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub media_data_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighter_data: Option<String>,
}

impl Snapshot {
    /// The empty-board default handed out when a slot has never been
    /// written (or its payload no longer decodes).
    pub fn empty() -> Self {
        Self {
            notes: Vec::new(),
            media: Vec::new(),
            connections: Vec::new(),
            note_id_counter: 0,
            board_width: BOARD_DEFAULT_WIDTH,
            board_height: BOARD_DEFAULT_HEIGHT,
            last_modified: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.media.is_empty()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// Flatten the board into its stored form. Items are split into the
    /// format's separate note/media arrays, in id order.
    pub fn to_snapshot(&self, last_modified: String) -> Snapshot {
        let mut notes = Vec::new();
        let mut media = Vec::new();
        for item in self.items() {
            match &item.kind {
                ItemKind::Note {
                    title,
                    content,
                    note_type,
                    color,
                } => notes.push(NoteRecord {
                    id: item.id,
                    x: item.x,
                    y: item.y,
                    width: item.width,
                    height: item.height,
                    title: title.clone(),
                    content: content.clone(),
                    note_type: *note_type,
                    color: *color,
                }),
                ItemKind::Media {
                    media_data_url,
                    aspect_ratio,
                    highlighter_data,
                } => media.push(MediaRecord {
                    id: item.id,
                    x: item.x,
                    y: item.y,
                    width: item.width,
                    height: item.height,
                    media_data_url: media_data_url.clone(),
                    aspect_ratio: *aspect_ratio,
                    highlighter_data: highlighter_data.clone(),
                }),
            }
        }
        Snapshot {
            notes,
            media,
            connections: self.connections().copied().collect(),
            note_id_counter: self.next_item_id,
            board_width: self.width,
            board_height: self.height,
            last_modified,
        }
    }

    /// Rebuild a live board from its stored form. Records with a
    /// duplicate id and connections whose endpoints are gone are dropped
    /// (with a log line) rather than poisoning the whole board.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut board = Board::new();
        board.width = snapshot.board_width;
        board.height = snapshot.board_height;
        board.next_item_id = snapshot.note_id_counter;

        for rec in &snapshot.notes {
            if board.contains(rec.id) {
                log::warn!("dropping note with duplicate id {}", rec.id);
                continue;
            }
            board.add_item(Item {
                id: rec.id,
                x: rec.x,
                y: rec.y,
                width: rec.width,
                height: rec.height,
                kind: ItemKind::Note {
                    title: rec.title.clone(),
                    content: rec.content.clone(),
                    note_type: rec.note_type,
                    color: rec.color,
                },
            });
        }
        for rec in &snapshot.media {
            if board.contains(rec.id) {
                log::warn!("dropping media with duplicate id {}", rec.id);
                continue;
            }
            board.add_item(Item {
                id: rec.id,
                x: rec.x,
                y: rec.y,
                width: rec.width,
                height: rec.height,
                kind: ItemKind::Media {
                    media_data_url: rec.media_data_url.clone(),
                    aspect_ratio: rec.aspect_ratio,
                    highlighter_data: rec.highlighter_data.clone(),
                },
            });
        }

        // The counter must clear every stored id even if the stored
        // counter fell behind (hand-edited or truncated payloads).
        let max_id = board.items().iter().map(|item| item.id.0 + 1).max();
        if let Some(max_id) = max_id
            && board.next_item_id < max_id
        {
            board.next_item_id = max_id;
        }

        for conn in &snapshot.connections {
            if !board.connect(conn.from, conn.to, conn.from_anchor, conn.to_anchor) {
                log::warn!("dropping stored connection {} → {}", conn.from, conn.to);
            }
        }
        board
    }
}
