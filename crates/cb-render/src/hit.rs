//! Hit testing: board-space point → what the pointer is over.
//!
//! Items are scanned front-to-back (reverse draw order, so the topmost
//! item wins). Within an item, the anchor dots and the resize handle
//! take priority over the body. The dots hang half outside the bounds,
//! so the dot check runs even when the body test misses.

use crate::anchor::anchor_points;
use cb_core::board::Board;
use cb_core::model::{Anchor, ItemId};
use kurbo::Point;

/// Pointer pick radius around an anchor dot, board units.
pub const ANCHOR_HIT_RADIUS: f64 = 10.0;
/// Side of the square resize zone in the bottom-right corner.
pub const RESIZE_HANDLE_SIZE: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Item body, drag territory.
    Item(ItemId),
    /// One of the four edge dots, connection territory.
    AnchorDot { id: ItemId, anchor: Anchor },
    /// Bottom-right corner zone.
    ResizeHandle(ItemId),
}

impl HitTarget {
    pub fn item_id(&self) -> ItemId {
        match *self {
            HitTarget::Item(id) => id,
            HitTarget::AnchorDot { id, .. } => id,
            HitTarget::ResizeHandle(id) => id,
        }
    }
}

/// Topmost target at `p`, or `None` for the board background.
pub fn hit_test(board: &Board, p: Point) -> Option<HitTarget> {
    for item in board.items().into_iter().rev() {
        let bounds = item.bounds();

        for (anchor, dot) in anchor_points(&bounds) {
            if dot.distance(p) <= ANCHOR_HIT_RADIUS {
                return Some(HitTarget::AnchorDot {
                    id: item.id,
                    anchor,
                });
            }
        }

        if bounds.contains(p.x, p.y) {
            let in_handle = p.x >= bounds.x + bounds.width - RESIZE_HANDLE_SIZE
                && p.y >= bounds.y + bounds.height - RESIZE_HANDLE_SIZE;
            if in_handle {
                return Some(HitTarget::ResizeHandle(item.id));
            }
            return Some(HitTarget::Item(item.id));
        }
    }
    None
}
