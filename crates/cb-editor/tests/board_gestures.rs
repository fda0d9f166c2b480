//! Integration tests: drag, resize, pan and zoom gestures (cb-editor).

use kurbo::Point;
use pretty_assertions::assert_eq;

use cb_core::model::{ItemId, NoteType};
use cb_core::viewport::{ZOOM_MAX, ZOOM_MIN};
use cb_editor::engine::EditorEngine;
use cb_editor::input::InputEvent;
use cb_editor::mutation::BoardMutation;

/// Half scale, (50, 50) pan; every mapping in these tests stays exact.
fn fitted_engine() -> EditorEngine {
    EditorEngine::new(1100.0, 850.0)
}

fn engine_with_note(x: f64, y: f64) -> (EditorEngine, ItemId) {
    let mut eng = fitted_engine();
    let id = eng
        .apply(BoardMutation::AddNote {
            x,
            y,
            note_type: NoteType::Theory,
        })
        .created
        .unwrap();
    (eng, id)
}

fn press_at(eng: &mut EditorEngine, board_x: f64, board_y: f64) -> cb_editor::mutation::Effect {
    let s = eng.viewport.board_to_screen(Point::new(board_x, board_y));
    eng.handle_event(&InputEvent::from_pointer_down(s.x, s.y, 0))
}

fn move_to(eng: &mut EditorEngine, board_x: f64, board_y: f64) -> cb_editor::mutation::Effect {
    let s = eng.viewport.board_to_screen(Point::new(board_x, board_y));
    eng.handle_event(&InputEvent::from_pointer_move(s.x, s.y))
}

fn release(eng: &mut EditorEngine) -> cb_editor::mutation::Effect {
    eng.handle_event(&InputEvent::from_pointer_up(0.0, 0.0))
}

// ─── Dragging ───────────────────────────────────────────────────────────

#[test]
fn drag_moves_by_pointer_delta_without_jumping() {
    let (mut eng, id) = engine_with_note(100.0, 100.0);

    // Grab near the top-left of the card, not its corner
    press_at(&mut eng, 140.0, 130.0);
    assert_eq!(eng.mode().dragged_item(), Some(id));

    move_to(&mut eng, 340.0, 230.0);
    let item = eng.board.get_by_id(id).unwrap();
    assert_eq!((item.x, item.y), (300.0, 200.0));

    // Persist lands on release, not per frame
    let effect = release(&mut eng);
    assert!(effect.persist);
    assert!(eng.mode().is_idle());
}

#[test]
fn drag_clamps_to_the_board() {
    let (mut eng, id) = engine_with_note(100.0, 100.0);
    press_at(&mut eng, 200.0, 175.0);

    move_to(&mut eng, -500.0, 175.0);
    let item = eng.board.get_by_id(id).unwrap();
    assert_eq!(item.x, 0.0);

    move_to(&mut eng, 3000.0, 2000.0);
    let item = eng.board.get_by_id(id).unwrap();
    assert_eq!(item.x, eng.board.width - item.width);
    assert_eq!(item.y, eng.board.height - item.height);
}

#[test]
fn move_frames_redraw_but_do_not_persist() {
    let (mut eng, _) = engine_with_note(100.0, 100.0);
    press_at(&mut eng, 200.0, 175.0);

    let effect = move_to(&mut eng, 260.0, 235.0);
    assert!(effect.changed);
    assert!(!effect.persist);
}

// ─── Resizing ───────────────────────────────────────────────────────────

#[test]
fn corner_drag_resizes_by_pointer_delta() {
    let (mut eng, id) = engine_with_note(500.0, 400.0);

    // Corner zone of the 200×150 card at (500,400) starts at (686,536)
    press_at(&mut eng, 695.0, 545.0);
    move_to(&mut eng, 795.0, 645.0);

    let item = eng.board.get_by_id(id).unwrap();
    assert_eq!((item.width, item.height), (300.0, 250.0));

    let effect = release(&mut eng);
    assert!(effect.persist);
}

#[test]
fn resize_respects_note_minimums() {
    let (mut eng, id) = engine_with_note(500.0, 400.0);
    press_at(&mut eng, 695.0, 545.0);
    move_to(&mut eng, 300.0, 200.0);

    let item = eng.board.get_by_id(id).unwrap();
    assert_eq!((item.width, item.height), (150.0, 100.0));
}

// ─── Panning ────────────────────────────────────────────────────────────

#[test]
fn background_drag_pans_the_view() {
    let (mut eng, id) = engine_with_note(100.0, 100.0);
    let before = eng.board.get_by_id(id).map(|i| (i.x, i.y)).unwrap();

    eng.handle_event(&InputEvent::from_pointer_down(900.0, 700.0, 0));
    assert!(!eng.mode().is_idle());
    eng.handle_event(&InputEvent::from_pointer_move(920.0, 730.0));

    assert_eq!(eng.viewport.pan_x, 70.0);
    assert_eq!(eng.viewport.pan_y, 80.0);
    // The view moved; the item did not
    assert_eq!(eng.board.get_by_id(id).map(|i| (i.x, i.y)).unwrap(), before);

    let effect = release(&mut eng);
    assert!(!effect.persist, "pans are view state, never board state");
}

// ─── Zoom ───────────────────────────────────────────────────────────────

#[test]
fn wheel_zoom_keeps_the_focal_point_fixed() {
    let mut eng = fitted_engine();
    let focal_screen = Point::new(150.0, 100.0);
    let focal_board = eng.viewport.screen_to_board(focal_screen);

    eng.handle_event(&InputEvent::Wheel {
        x: focal_screen.x,
        y: focal_screen.y,
        delta_y: -100.0,
    });

    assert!(eng.viewport.zoom > 0.5);
    let mapped = eng.viewport.board_to_screen(focal_board);
    assert!((mapped.x - focal_screen.x).abs() < 1e-9);
    assert!((mapped.y - focal_screen.y).abs() < 1e-9);
}

#[test]
fn zoom_keys_step_and_reset() {
    let mut eng = fitted_engine();
    let key = |k: &str, ctrl: bool| InputEvent::Key {
        key: k.into(),
        ctrl,
        shift: false,
        alt: false,
        meta: false,
    };

    eng.handle_event(&key("=", true));
    assert_eq!(eng.viewport.zoom, 0.75);

    eng.handle_event(&key("-", true));
    eng.handle_event(&key("-", true));
    assert_eq!(eng.viewport.zoom, ZOOM_MIN);

    eng.handle_event(&key("0", true));
    assert_eq!(eng.viewport.zoom, 0.5);

    for _ in 0..20 {
        eng.handle_event(&key("=", true));
    }
    assert_eq!(eng.viewport.zoom, ZOOM_MAX);
}

// ─── Mode exclusivity ───────────────────────────────────────────────────

#[test]
fn second_press_during_a_gesture_is_ignored() {
    let (mut eng, id) = engine_with_note(100.0, 100.0);
    press_at(&mut eng, 200.0, 175.0);
    assert_eq!(eng.mode().dragged_item(), Some(id));

    // A stray second press (other button, touch glitch) changes nothing
    let effect = press_at(&mut eng, 600.0, 500.0);
    assert!(!effect.changed);
    assert_eq!(eng.mode().dragged_item(), Some(id));
}

#[test]
fn escape_cancels_a_drag_in_place() {
    let (mut eng, id) = engine_with_note(100.0, 100.0);
    press_at(&mut eng, 200.0, 175.0);
    move_to(&mut eng, 400.0, 375.0);

    eng.handle_event(&InputEvent::Key {
        key: "Escape".into(),
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    });
    assert!(eng.mode().is_idle());
    // The item keeps the position it was dragged to
    assert_eq!(eng.board.get_by_id(id).unwrap().x, 300.0);
}
