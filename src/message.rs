//! Annotator message types.
//!
//! Every user action is represented as a message in the Elm architecture
//! style and applied with [`AnnotatorState::update`](crate::state::AnnotatorState::update).
//! Messages are serde types so that recorded sessions can be replayed.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::model::{CellIndex, ColumnType, DocumentState};
use crate::state::SelectionTarget;
use crate::structure::Border;

/// Messages that can be sent to update annotator state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    // Navigation
    /// Switch to the image at this index
    SelectImage(usize),
    /// Switch to the previous image
    PreviousImage,
    /// Switch to the next image
    NextImage,
    /// Rotate the page view by this many degrees
    RotateView(f32),
    /// Set the page view rotation
    SetViewRotation(f32),
    /// Pointer moved to a page position
    PointerMoved(Point),
    /// The page was laid out at this position
    DocumentMoved(Point),
    /// Annotation progress of the current image changed
    SetDocumentState(DocumentState),

    // Tables
    /// Place one corner of a new table outline
    OutlineTable(Point),
    /// Abort drawing and forget deletion marks
    CancelActions,
    /// Select a table, or none
    SelectTable(Option<usize>),
    /// Press the delete-table gesture once
    DeleteTable,
    /// Delete whatever is selected
    DeleteSelected,
    /// Freeze or unfreeze the selected table's structure
    LockTable(bool),

    // Grid
    /// Select a handle of the selected table
    Select(SelectionTarget),
    /// Drop the handle selection
    ResetSelection,
    /// Preview a new column line under this page position
    PreviewColumn(Option<Point>),
    /// Preview a new row line under this page position
    PreviewRow(Option<Point>),
    /// Insert a column line, at the preview when no position is given
    AddColumn(Option<f32>),
    /// Insert a row line, at the preview when no position is given
    AddRow(Option<f32>),
    /// Remove the selected column line
    DeleteColumn,
    /// Remove the selected row line
    DeleteRow,
    /// Move the selected column line or cell wall
    AdjustColumn(f32),
    /// Move the selected row line or cell wall
    AdjustRow(f32),
    /// Move the selected border
    AdjustBorder(f32),
    /// Pointer pressed on a handle
    DragStarted(SelectionTarget),
    /// Pointer released
    DragEnded,

    // Predictions and OCR
    /// Ask for row lines of the selected table
    SegmentTable,
    /// Ask for cell contents of the selected table
    PredictTableContent,
    /// Enter or leave the OCR view
    SetOcrView(bool),
    /// Correct the text of one cell
    UpdateCellText { cell: CellIndex, text: String },
    /// Blank all corrected texts
    ClearCellTexts,
    /// Tag a column
    SetColumnTypes {
        column: usize,
        types: Vec<ColumnType>,
    },
    /// Append an empty virtual value
    AddVirtualValue,
    /// Choose the meaning of a virtual value
    SetVirtualValueLabel {
        index: usize,
        label: Option<ColumnType>,
    },
    /// Set the text of a virtual value
    SetVirtualValue { index: usize, value: String },
    /// Remove a virtual value
    RemoveVirtualValue(usize),
}

impl Message {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Message::SelectImage(_) => "select image",
            Message::PreviousImage => "previous image",
            Message::NextImage => "next image",
            Message::RotateView(_) => "rotate view",
            Message::SetViewRotation(_) => "set view rotation",
            Message::PointerMoved(_) => "pointer moved",
            Message::DocumentMoved(_) => "document moved",
            Message::SetDocumentState(_) => "set document state",
            Message::OutlineTable(_) => "outline table",
            Message::CancelActions => "cancel",
            Message::SelectTable(_) => "select table",
            Message::DeleteTable => "delete table",
            Message::DeleteSelected => "delete selected",
            Message::LockTable(_) => "lock table",
            Message::Select(_) => "select",
            Message::ResetSelection => "reset selection",
            Message::PreviewColumn(_) => "preview column",
            Message::PreviewRow(_) => "preview row",
            Message::AddColumn(_) => "add column",
            Message::AddRow(_) => "add row",
            Message::DeleteColumn => "delete column",
            Message::DeleteRow => "delete row",
            Message::AdjustColumn(_) => "adjust column",
            Message::AdjustRow(_) => "adjust row",
            Message::AdjustBorder(_) => "adjust border",
            Message::DragStarted(_) => "drag started",
            Message::DragEnded => "drag ended",
            Message::SegmentTable => "segment table",
            Message::PredictTableContent => "predict table content",
            Message::SetOcrView(_) => "set OCR view",
            Message::UpdateCellText { .. } => "update cell text",
            Message::ClearCellTexts => "clear cell texts",
            Message::SetColumnTypes { .. } => "set column types",
            Message::AddVirtualValue => "add virtual value",
            Message::SetVirtualValueLabel { .. } => "set virtual value label",
            Message::SetVirtualValue { .. } => "set virtual value",
            Message::RemoveVirtualValue(_) => "remove virtual value",
        }
    }
}
