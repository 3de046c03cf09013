//! Global constants for the table annotator

use std::time::Duration;

/// Minimum width and height of any cell, and minimum distance between a grid
/// line and its neighbours or the outline edge.
pub const MIN_CELL_SIZE: f32 = 10.0;

/// Half the size of a line knob, subtracted when mapping pointer positions
/// onto line positions.
pub const HANDLE_OFFSET: f32 = 7.0;

/// Pointer moves are ignored until a drag has lasted this long.
pub const DRAG_START_DELAY: Duration = Duration::from_millis(100);

/// How long the "saved" indicator stays visible.
pub const SAVED_INDICATOR_DURATION: Duration = Duration::from_secs(2);

/// Quiet period before a changed table list is written.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(150);

/// View rotation step of the rotate keys, in degrees.
pub const ROTATION_STEP_DEGREES: f32 = 0.5;

/// Delete presses that only mark a table; the next one deletes it.
pub const DELETION_MARKS_REQUIRED: u8 = 2;

/// Directory inside an image folder holding per-image table files.
pub const TABLES_DIR: &str = ".tables";
