//! Integration test: a whole investigation session, pointer to storage.
//!
//! Pin two notes, string them together, tear one down, save the board,
//! then rebuild everything from the same backend as a page reload would.

use kurbo::Point;
use pretty_assertions::assert_eq;

use cb_core::board::Board;
use cb_core::model::{Anchor, NoteType};
use cb_core::store::{BoardId, BoardStore, MemoryStorage};
use cb_editor::engine::EditorEngine;
use cb_editor::input::InputEvent;
use cb_editor::mutation::BoardMutation;
use cb_render::anchor::resolve;

fn press_at(eng: &mut EditorEngine, board_x: f64, board_y: f64) {
    let s = eng.viewport.board_to_screen(Point::new(board_x, board_y));
    eng.handle_event(&InputEvent::from_pointer_down(s.x, s.y, 0));
    eng.handle_event(&InputEvent::from_pointer_up(s.x, s.y));
}

#[test]
fn pin_string_unpin_save_reload() {
    let mut store = BoardStore::new(MemoryStorage::new());
    let mut eng = EditorEngine::new(1100.0, 850.0);

    // Pin two notes
    let first = eng
        .apply(BoardMutation::AddNote {
            x: 100.0,
            y: 100.0,
            note_type: NoteType::Concept,
        })
        .created
        .unwrap();
    let second = eng
        .apply(BoardMutation::AddNote {
            x: 500.0,
            y: 400.0,
            note_type: NoteType::Question,
        })
        .created
        .unwrap();

    // The first card's top anchor sits at the midpoint of its top edge
    let bounds = eng.board.get_by_id(first).unwrap().bounds();
    assert_eq!(resolve(&bounds, Some(Anchor::Top)), Point::new(200.0, 100.0));

    // String them together: top of the first to bottom of the second
    press_at(&mut eng, 200.0, 100.0);
    press_at(&mut eng, 600.0, 550.0);

    assert_eq!(eng.board.connection_count(), 1);
    let conn = *eng.board.connections().next().unwrap();
    assert_eq!((conn.from, conn.to), (first, second));
    assert_eq!(
        (conn.from_anchor, conn.to_anchor),
        (Anchor::Top, Anchor::Bottom)
    );

    // Tear down the second note; its string goes with it
    eng.apply(BoardMutation::RemoveItem { id: second });
    assert_eq!(eng.board.item_count(), 1);
    assert_eq!(eng.board.connection_count(), 0);

    // Save into slot 1
    let snapshot = eng.board.to_snapshot("2026-03-14T09:26:53.000Z".into());
    store.save(BoardId::FIRST, &snapshot);

    // Page reload: a fresh store over the same backend, a fresh board
    let store = BoardStore::new(store.backend().clone());
    let restored = Board::from_snapshot(&store.load(BoardId::FIRST));

    assert_eq!(restored.item_count(), 1);
    assert_eq!(restored.connection_count(), 0);
    let survivor = restored.get_by_id(first).unwrap();
    assert_eq!((survivor.x, survivor.y), (100.0, 100.0));
    assert_eq!((survivor.width, survivor.height), (200.0, 150.0));

    // New pins on the restored board never reuse the old ids
    let mut eng = EditorEngine::new(1100.0, 850.0);
    eng.open_board(restored);
    let next = eng
        .apply(BoardMutation::AddNote {
            x: 50.0,
            y: 50.0,
            note_type: NoteType::Theory,
        })
        .created
        .unwrap();
    assert!(next > second);
}
