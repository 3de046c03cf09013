//! Table cells and their local wall offsets.

use serde::{Deserialize, Serialize};

/// Position of a cell inside a table's row-major grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellIndex {
    pub row: usize,
    pub column: usize,
}

impl CellIndex {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// A single table cell.
///
/// Each side may carry a signed pixel offset that is added to the shared grid
/// line forming that side, bending this one cell's wall away from the line.
/// Of the two cells sharing a wall, only one is ever edited through the wall
/// handle, but both store their own offset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f32>,
    /// Text returned by OCR content prediction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
    /// Text corrected by a human annotator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_text: Option<String>,
}

impl Cell {
    /// Offset of the top wall, zero when unset.
    pub fn top_offset(&self) -> f32 {
        self.top.unwrap_or(0.0)
    }

    /// Offset of the right wall, zero when unset.
    pub fn right_offset(&self) -> f32 {
        self.right.unwrap_or(0.0)
    }

    /// Offset of the bottom wall, zero when unset.
    pub fn bottom_offset(&self) -> f32 {
        self.bottom.unwrap_or(0.0)
    }

    /// Offset of the left wall, zero when unset.
    pub fn left_offset(&self) -> f32 {
        self.left.unwrap_or(0.0)
    }

    /// Whether the left or right wall has been bent.
    pub fn has_vertical_wall_offset(&self) -> bool {
        self.left_offset() != 0.0 || self.right_offset() != 0.0
    }

    /// Whether the top or bottom wall has been bent.
    pub fn has_horizontal_wall_offset(&self) -> bool {
        self.top_offset() != 0.0 || self.bottom_offset() != 0.0
    }

    /// Drop both OCR and human text.
    pub fn clear_text(&mut self) {
        self.ocr_text = None;
        self.human_text = None;
    }

    /// Copy of this cell without any text.
    pub fn without_text(&self) -> Self {
        Self {
            ocr_text: None,
            human_text: None,
            ..self.clone()
        }
    }

    pub fn has_ocr_text(&self) -> bool {
        self.ocr_text.is_some()
    }
}
