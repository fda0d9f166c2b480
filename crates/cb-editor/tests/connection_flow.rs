//! Integration tests: the two-click string gesture (cb-editor).
//!
//! Drives the engine with raw pointer and key events and checks the
//! connect state machine end to end: start, preview, completion,
//! self-loop discard, duplicate rejection, and both cancel paths.

use kurbo::Point;
use pretty_assertions::assert_eq;

use cb_core::model::{Anchor, ItemId, NoteType};
use cb_editor::engine::EditorEngine;
use cb_editor::input::InputEvent;
use cb_editor::mutation::BoardMutation;

/// 1100×850 canvas fits the 2000×1500 default board at exactly half
/// scale with a (50, 50) pan, so board ↔ screen mapping stays exact.
fn fitted_engine() -> EditorEngine {
    EditorEngine::new(1100.0, 850.0)
}

/// Engine with two notes far enough apart that their dots never clash:
/// one at (100, 100), one at (500, 400), both 200×150.
fn engine_with_two_notes() -> (EditorEngine, ItemId, ItemId) {
    let mut eng = fitted_engine();
    let a = eng
        .apply(BoardMutation::AddNote {
            x: 100.0,
            y: 100.0,
            note_type: NoteType::Concept,
        })
        .created
        .unwrap();
    let b = eng
        .apply(BoardMutation::AddNote {
            x: 500.0,
            y: 400.0,
            note_type: NoteType::Fact,
        })
        .created
        .unwrap();
    (eng, a, b)
}

fn press_at(eng: &mut EditorEngine, board_x: f64, board_y: f64) -> cb_editor::mutation::Effect {
    let s = eng.viewport.board_to_screen(Point::new(board_x, board_y));
    eng.handle_event(&InputEvent::from_pointer_down(s.x, s.y, 0))
}

fn move_to(eng: &mut EditorEngine, board_x: f64, board_y: f64) -> cb_editor::mutation::Effect {
    let s = eng.viewport.board_to_screen(Point::new(board_x, board_y));
    eng.handle_event(&InputEvent::from_pointer_move(s.x, s.y))
}

fn escape(eng: &mut EditorEngine) -> cb_editor::mutation::Effect {
    eng.handle_event(&InputEvent::Key {
        key: "Escape".into(),
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    })
}

// ─── Happy path ─────────────────────────────────────────────────────────

#[test]
fn click_on_anchor_dot_starts_a_string() {
    let (mut eng, a, _) = engine_with_two_notes();

    // a's top anchor sits at (200, 100)
    let effect = press_at(&mut eng, 200.0, 100.0);
    assert!(effect.changed);
    assert!(eng.mode().is_connecting());

    let (start, _) = eng.connection_preview().unwrap();
    assert_eq!(start, Point::new(200.0, 100.0));
    assert_eq!(eng.board.get_by_id(a).unwrap().x, 100.0);
}

#[test]
fn preview_follows_the_pointer() {
    let (mut eng, _, _) = engine_with_two_notes();
    press_at(&mut eng, 200.0, 100.0);

    move_to(&mut eng, 400.0, 300.0);
    let (start, end) = eng.connection_preview().unwrap();
    assert_eq!(start, Point::new(200.0, 100.0));
    assert_eq!(end, Point::new(400.0, 300.0));

    // Release does not land the string; the gesture is click-click.
    eng.handle_event(&InputEvent::from_pointer_up(0.0, 0.0));
    assert!(eng.mode().is_connecting());
}

#[test]
fn second_click_on_another_dot_completes() {
    let (mut eng, a, b) = engine_with_two_notes();
    press_at(&mut eng, 200.0, 100.0);

    // b spans (500,400)..(700,550); its bottom anchor sits at (600, 550)
    let effect = press_at(&mut eng, 600.0, 550.0);
    assert!(effect.changed);
    assert!(effect.persist);
    assert!(eng.mode().is_idle());
    assert_eq!(eng.connection_preview(), None);

    assert_eq!(eng.board.connection_count(), 1);
    let conn = eng.board.connections().next().unwrap();
    assert_eq!(conn.from, a);
    assert_eq!(conn.to, b);
    assert_eq!(conn.from_anchor, Anchor::Top);
    assert_eq!(conn.to_anchor, Anchor::Bottom);
}

// ─── Rejections ─────────────────────────────────────────────────────────

#[test]
fn string_to_the_same_item_is_discarded() {
    let (mut eng, _, _) = engine_with_two_notes();
    press_at(&mut eng, 200.0, 100.0);

    // a's left anchor, same item
    let effect = press_at(&mut eng, 100.0, 175.0);
    assert!(effect.changed);
    assert!(!effect.persist);
    assert!(eng.mode().is_idle());
    assert_eq!(eng.board.connection_count(), 0);
}

#[test]
fn duplicate_string_changes_nothing_either_orientation() {
    let (mut eng, _, _) = engine_with_two_notes();
    press_at(&mut eng, 200.0, 100.0);
    press_at(&mut eng, 600.0, 550.0);
    assert_eq!(eng.board.connection_count(), 1);

    // Same pair again, from the other side
    press_at(&mut eng, 600.0, 550.0);
    let effect = press_at(&mut eng, 200.0, 100.0);
    assert!(effect.changed, "preview must clear even on a duplicate");
    assert!(!effect.persist);
    assert!(eng.mode().is_idle());
    assert_eq!(eng.board.connection_count(), 1);
}

// ─── Cancel paths ───────────────────────────────────────────────────────

#[test]
fn escape_cancels_the_string() {
    let (mut eng, _, _) = engine_with_two_notes();
    press_at(&mut eng, 200.0, 100.0);
    move_to(&mut eng, 400.0, 300.0);

    let effect = escape(&mut eng);
    assert!(effect.changed);
    assert!(eng.mode().is_idle());
    assert_eq!(eng.connection_preview(), None);
    assert_eq!(eng.board.connection_count(), 0);
}

#[test]
fn click_on_empty_space_cancels_the_string() {
    let (mut eng, _, _) = engine_with_two_notes();
    press_at(&mut eng, 200.0, 100.0);

    let effect = press_at(&mut eng, 1500.0, 1200.0);
    assert!(effect.changed);
    assert!(eng.mode().is_idle());
    assert_eq!(eng.board.connection_count(), 0);
}

#[test]
fn click_on_a_card_body_keeps_the_string_live() {
    let (mut eng, _, _) = engine_with_two_notes();
    press_at(&mut eng, 200.0, 100.0);

    // b's body center
    let effect = press_at(&mut eng, 600.0, 475.0);
    assert!(!effect.changed);
    assert!(eng.mode().is_connecting());
    assert!(eng.connection_preview().is_some());
}

#[test]
fn removing_the_source_item_drops_the_string() {
    let (mut eng, a, _) = engine_with_two_notes();
    press_at(&mut eng, 200.0, 100.0);
    assert!(eng.mode().is_connecting());

    eng.apply(BoardMutation::RemoveItem { id: a });
    assert!(eng.mode().is_idle());
    assert_eq!(eng.connection_preview(), None);
}
