//! Anchor resolution: named edge → board-space point.
//!
//! Every string endpoint goes through here, once per endpoint per redraw,
//! and once per frame for the live preview end while a connection is
//! being drawn.

use cb_core::model::{Anchor, ItemBounds};
use kurbo::Point;
use smallvec::SmallVec;

/// Board-space midpoint of the named edge. An unrecognized anchor
/// (`None` after parsing) falls back to the item's center.
pub fn resolve(bounds: &ItemBounds, anchor: Option<Anchor>) -> Point {
    let ItemBounds {
        x,
        y,
        width,
        height,
    } = *bounds;
    match anchor {
        Some(Anchor::Top) => Point::new(x + width / 2.0, y),
        Some(Anchor::Bottom) => Point::new(x + width / 2.0, y + height),
        Some(Anchor::Left) => Point::new(x, y + height / 2.0),
        Some(Anchor::Right) => Point::new(x + width, y + height / 2.0),
        None => bounds.center(),
    }
}

/// All four anchor points of an item, in `Anchor::ALL` order. Used for
/// drawing the anchor dots and for dot hit testing.
pub fn anchor_points(bounds: &ItemBounds) -> SmallVec<[(Anchor, Point); 4]> {
    Anchor::ALL
        .iter()
        .map(|&anchor| (anchor, resolve(bounds, Some(anchor))))
        .collect()
}
