//! Behaviour tests for the annotator state.
//!
//! These drive [`AnnotatorState`] through complete user interactions and
//! check the properties every edit has to keep.

mod scenarios;

use web_time::Instant;

use crate::geometry::Point;
use crate::model::{Image, Table};
use crate::state::{AnnotatorState, Request};

/// A state with one 400x300 page loaded and laid out at the origin.
fn loaded_state() -> AnnotatorState {
    let mut state = AnnotatorState::default();
    let images = vec![
        Image::new("page_001.png", "images/page_001.png", 400, 300),
        Image::new("page_002.png", "images/page_002.png", 400, 300),
    ];
    let Some(Request::FetchTables { id, .. }) = state.load_images(images, None).expect("load")
    else {
        panic!("expected a table fetch");
    };
    state
        .complete_fetch_tables(id, Ok::<Vec<Table>, String>(Vec::new()))
        .expect("fetch");
    state.set_document_position(Point::new(0.0, 0.0));
    state
}

/// Draw a table by clicking both corners.
fn draw_table(state: &mut AnnotatorState, first: Point, second: Point) {
    state.outline_table(first).expect("first corner");
    state.outline_table(second).expect("second corner");
}

fn now() -> Instant {
    Instant::now()
}
