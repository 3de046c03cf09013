//! Error types for table edits.

use thiserror::Error;

/// Reasons an edit was rejected.
///
/// A rejected edit never changes any state; callers that only care about the
/// interactive behaviour may drop the error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// The operation needs a selected table
    #[error("No table is selected")]
    NoTableSelected,

    /// An index no longer refers to anything
    #[error("Invalid {what} index {index}")]
    InvalidIndex {
        /// Kind of thing the index points at
        what: &'static str,
        /// The offending index
        index: usize,
    },

    /// The table structure has been frozen
    #[error("Table structure is locked")]
    StructureLocked,

    /// Structural edits are disabled while the OCR view is shown
    #[error("Not allowed while the OCR view is active")]
    OcrViewActive,

    /// A cell would become narrower or lower than the minimum size
    #[error("Cell ({row}, {column}) would shrink to {size:.1}px")]
    CellTooSmall {
        /// Row of the offending cell
        row: usize,
        /// Column of the offending cell
        column: usize,
        /// Resulting width or height
        size: f32,
    },

    /// A grid line would come too close to a neighbour or an outline edge
    #[error("Line at {position:.1} would be too close to {neighbour:.1}")]
    LineTooClose {
        /// Candidate line position
        position: f32,
        /// Position of the neighbouring line or edge
        neighbour: f32,
    },

    /// One of the two cells sharing a wall already bends the other way
    #[error("Cell ({row}, {column}) already has a perpendicular wall offset")]
    ConflictingOffset {
        /// Row of the conflicting cell
        row: usize,
        /// Column of the conflicting cell
        column: usize,
    },

    /// The table outline would leave the image
    #[error("Table outline would leave the image")]
    OutOfImageBounds,

    /// A line already exists at this position
    #[error("A line already exists at {position:.1}")]
    DuplicateLine {
        /// The duplicated position
        position: f32,
    },

    /// A prediction is running
    #[error("A prediction request is in progress")]
    OperationInProgress,

    /// A response arrived for a request that is no longer current
    #[error("Request {id} is no longer current")]
    StaleRequest {
        /// Ticket of the stale request
        id: u64,
    },

    /// Predicted cells do not fit the table grid
    #[error("Expected {expected_rows}x{expected_columns} cells")]
    ShapeMismatch {
        /// Number of cell rows the table has
        expected_rows: usize,
        /// Number of cell columns the table has
        expected_columns: usize,
    },

    /// Some other precondition of the operation does not hold
    #[error("Precondition not met: {0}")]
    PreconditionNotMet(&'static str),
}
