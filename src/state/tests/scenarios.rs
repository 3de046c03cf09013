//! End-to-end editing sessions.

use super::{draw_table, loaded_state, now};
use crate::geometry::{Point, Rectangle};
use crate::message::Message;
use crate::model::Cell;
use crate::state::SelectionTarget;

#[test]
fn test_create_table_by_clicking_corners() {
    let mut state = loaded_state();
    draw_table(&mut state, Point::new(10.0, 10.0), Point::new(110.0, 60.0));

    let table = &state.tables()[0];
    assert_eq!(
        table.outline,
        Rectangle {
            top_left: Point::new(10.0, 10.0),
            bottom_right: Point::new(110.0, 60.0),
        }
    );
    assert!(table.rows.is_empty());
    assert!(table.columns.is_empty());
    assert_eq!(table.cells, vec![vec![Cell::default()]]);
}

#[test]
fn test_add_column_splits_cells() {
    let mut state = loaded_state();
    draw_table(&mut state, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
    state.add_column(Some(50.0)).expect("add column");

    let table = &state.tables()[0];
    assert_eq!(table.columns, vec![50.0]);
    assert_eq!(table.cells, vec![vec![Cell::default(), Cell::default()]]);
    assert_eq!(table.column_types, vec![Vec::new(), Vec::new()]);
}

#[test]
fn test_adjust_column_past_edge_is_rejected() {
    let mut state = loaded_state();
    draw_table(&mut state, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
    state.add_column(Some(50.0)).expect("add column");
    state.select(SelectionTarget::Column(0)).expect("select");

    assert!(state.adjust_column(60.0).is_err());
    assert_eq!(state.tables()[0].columns, vec![50.0]);
}

#[test]
fn test_delete_column_fuses_cells() {
    let mut state = loaded_state();
    draw_table(&mut state, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
    state.add_column(Some(50.0)).expect("add column");
    state.select(SelectionTarget::Column(0)).expect("select");
    state.delete_column().expect("delete column");

    let table = &state.tables()[0];
    assert!(table.columns.is_empty());
    assert_eq!(table.cells, vec![vec![Cell::default()]]);
    assert_eq!(table.column_types.len(), 1);
}

#[test]
fn test_selection_change_resets_table_deletion() {
    let mut state = loaded_state();
    draw_table(&mut state, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
    draw_table(&mut state, Point::new(10.0, 100.0), Point::new(110.0, 160.0));

    state.select_table(Some(0)).expect("select");
    state.delete_table().expect("first press");
    state.select_table(Some(1)).expect("select other");
    state.select_table(Some(0)).expect("select again");
    state.delete_table().expect("second press");
    assert_eq!(state.tables().len(), 2);

    state.delete_table().expect("press");
    state.delete_table().expect("press");
    assert_eq!(state.tables().len(), 1);
    assert_eq!(state.tables()[0].outline.top_left, Point::new(10.0, 100.0));
    assert_eq!(state.selection().table(), None);
}

#[test]
fn test_message_replay_builds_grid() {
    let mut state = loaded_state();
    let messages = [
        Message::OutlineTable(Point::new(10.0, 10.0)),
        Message::OutlineTable(Point::new(210.0, 110.0)),
        Message::AddColumn(Some(100.0)),
        Message::AddRow(Some(50.0)),
        Message::Select(SelectionTarget::CellColumnLine(crate::model::CellIndex::new(0, 0))),
        Message::AdjustColumn(-20.0),
    ];
    let time = now();
    for message in messages {
        assert_eq!(state.update(message, time), Ok(None));
    }

    let table = &state.tables()[0];
    assert_eq!(table.columns, vec![100.0]);
    assert_eq!(table.rows, vec![50.0]);
    assert_eq!(table.cells[0][0].right, Some(-20.0));
    assert_eq!(table.cells[0][1].left, Some(-20.0));
    assert_eq!(table.cells[1][0].right, None);
}
