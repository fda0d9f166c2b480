//! Pan/zoom state and the screen ↔ board mapping.
//!
//! The transform is `translate(pan) * scale(zoom)`: a board point `b`
//! lands on screen at `b * zoom + pan`. Zooming toward a focal point
//! re-solves the pan so the board point under the cursor stays put.

use kurbo::{Affine, Point};

pub const ZOOM_MIN: f64 = 0.25;
pub const ZOOM_MAX: f64 = 3.0;
/// Button zoom step.
pub const ZOOM_STEP: f64 = 0.25;
/// Screen padding kept around the board when fitting, px per side.
pub const FIT_PADDING: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    /// Visible surface size, screen px.
    pub screen_width: f64,
    pub screen_height: f64,
}

impl Viewport {
    pub fn new(screen_width: f64, screen_height: f64) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            screen_width,
            screen_height,
        }
    }

    pub fn set_screen_size(&mut self, width: f64, height: f64) {
        self.screen_width = width;
        self.screen_height = height;
    }

    /// Board → screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate((self.pan_x, self.pan_y)) * Affine::scale(self.zoom)
    }

    pub fn board_to_screen(&self, p: Point) -> Point {
        self.transform() * p
    }

    pub fn screen_to_board(&self, p: Point) -> Point {
        self.transform().inverse() * p
    }

    /// Clamp and apply a zoom factor. The board point under `focal`
    /// (viewport center when `None`) stays under it afterwards.
    pub fn set_zoom(&mut self, factor: f64, focal: Option<Point>) {
        let zoom = factor.clamp(ZOOM_MIN, ZOOM_MAX);
        let focal = focal.unwrap_or_else(|| {
            Point::new(self.screen_width / 2.0, self.screen_height / 2.0)
        });
        let anchor = self.screen_to_board(focal);
        self.zoom = zoom;
        // focal = anchor * zoom + pan, solved for pan
        self.pan_x = focal.x - anchor.x * zoom;
        self.pan_y = focal.y - anchor.y * zoom;
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP, None);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP, None);
    }

    /// Wheel zoom toward the cursor. Positive `delta_y` (scroll down)
    /// zooms out.
    pub fn wheel_zoom(&mut self, delta_y: f64, focal: Point) {
        let factor = self.zoom * 1.05_f64.powf(-delta_y / 100.0);
        self.set_zoom(factor, Some(focal));
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Fit the whole board extent on screen with `FIT_PADDING` per side,
    /// centered. The fit zoom is clamped to the usual range.
    pub fn reset_to_fit(&mut self, board_width: f64, board_height: f64) {
        let avail_w = (self.screen_width - 2.0 * FIT_PADDING).max(1.0);
        let avail_h = (self.screen_height - 2.0 * FIT_PADDING).max(1.0);
        let fit = (avail_w / board_width).min(avail_h / board_height);
        self.zoom = fit.clamp(ZOOM_MIN, ZOOM_MAX);
        self.pan_x = (self.screen_width - board_width * self.zoom) / 2.0;
        self.pan_y = (self.screen_height - board_height * self.zoom) / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn screen_board_mapping_is_inverse() {
        let mut vp = Viewport::new(1200.0, 800.0);
        vp.zoom = 1.5;
        vp.pan_x = -320.0;
        vp.pan_y = 75.0;

        let p = Point::new(400.0, 250.0);
        assert!(close(vp.board_to_screen(vp.screen_to_board(p)), p));
        assert!(close(vp.screen_to_board(vp.board_to_screen(p)), p));
    }

    #[test]
    fn zoom_clamps_to_range() {
        let mut vp = Viewport::new(1200.0, 800.0);
        vp.set_zoom(100.0, None);
        assert_eq!(vp.zoom, ZOOM_MAX);
        vp.set_zoom(0.0001, None);
        assert_eq!(vp.zoom, ZOOM_MIN);
    }

    #[test]
    fn zoom_keeps_focal_point_fixed() {
        let mut vp = Viewport::new(1200.0, 800.0);
        vp.pan_x = -150.0;
        vp.pan_y = 40.0;

        let focal = Point::new(500.0, 300.0);
        let before = vp.screen_to_board(focal);
        vp.set_zoom(2.0, Some(focal));
        let after = vp.screen_to_board(focal);
        assert!(close(before, after), "{before:?} vs {after:?}");

        // And again through the wheel path
        vp.wheel_zoom(-240.0, focal);
        assert!(close(vp.screen_to_board(focal), before));
    }

    #[test]
    fn zoom_steps_move_by_quarter() {
        let mut vp = Viewport::new(1200.0, 800.0);
        vp.zoom_in();
        assert_eq!(vp.zoom, 1.25);
        vp.zoom_out();
        vp.zoom_out();
        assert_eq!(vp.zoom, 0.75);
    }

    #[test]
    fn reset_fits_and_centers_the_board() {
        let mut vp = Viewport::new(1100.0, 900.0);
        vp.zoom = 2.0;
        vp.pan_x = 500.0;

        vp.reset_to_fit(2000.0, 1500.0);
        // Width-limited: (1100 - 100) / 2000 = 0.5
        assert_eq!(vp.zoom, 0.5);

        // Board corners land symmetrically inside the screen
        let tl = vp.board_to_screen(Point::new(0.0, 0.0));
        let br = vp.board_to_screen(Point::new(2000.0, 1500.0));
        assert!((tl.x - (1100.0 - br.x)).abs() < 1e-9);
        assert!((tl.y - (900.0 - br.y)).abs() < 1e-9);
        assert_eq!(tl.x, 50.0);
    }

    #[test]
    fn reset_zoom_respects_the_clamp() {
        let mut vp = Viewport::new(300.0, 300.0);
        vp.reset_to_fit(5000.0, 5000.0);
        assert_eq!(vp.zoom, ZOOM_MIN);
    }
}
