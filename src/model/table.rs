//! The table entity: outline, grid lines and cell grid.

use serde::{Deserialize, Serialize};

use super::{Cell, CellIndex, ColumnType};
use crate::geometry::{Point, Rectangle};

/// A synthetic value attached to a table, e.g. a camp name that applies to
/// every row but is printed only once in the document header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualValue {
    /// What the value means, once chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<ColumnType>,
    #[serde(default)]
    pub value: String,
}

/// First corner of a table outline, waiting for the second click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfinishedTable {
    pub first_point: Point,
}

/// A table annotated on an image.
///
/// Grid lines are stored as offsets from the outline's top-left corner in the
/// table's own, un-rotated frame. `cells` is row-major and always has
/// `rows.len() + 1` rows of `columns.len() + 1` cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub outline: Rectangle,
    /// Display rotation that was active when the table was drawn.
    pub rotation_degrees: f32,
    pub columns: Vec<f32>,
    pub rows: Vec<f32>,
    pub cells: Vec<Vec<Cell>>,
    #[serde(default)]
    pub structure_locked: bool,
    #[serde(default)]
    pub column_types: Vec<Vec<ColumnType>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub virtual_values: Vec<VirtualValue>,
    /// Per-row result of matching against an external register, opaque here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<serde_json::Value>>,
}

impl Table {
    /// Create a table from two arbitrary outline corners with a single cell.
    pub fn new(first: Point, second: Point, rotation_degrees: f32) -> Self {
        Self {
            outline: Rectangle::from_corners(first, second),
            rotation_degrees,
            columns: Vec::new(),
            rows: Vec::new(),
            cells: vec![vec![Cell::default()]],
            structure_locked: false,
            column_types: vec![Vec::new()],
            virtual_values: Vec::new(),
            matches: None,
        }
    }

    pub fn width(&self) -> f32 {
        self.outline.width()
    }

    pub fn height(&self) -> f32 {
        self.outline.height()
    }

    /// Number of cell rows (one more than the number of row lines).
    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of cell columns (one more than the number of column lines).
    pub fn column_count(&self) -> usize {
        self.columns.len() + 1
    }

    pub fn cell(&self, index: CellIndex) -> Option<&Cell> {
        self.cells.get(index.row)?.get(index.column)
    }

    pub fn cell_mut(&mut self, index: CellIndex) -> Option<&mut Cell> {
        self.cells.get_mut(index.row)?.get_mut(index.column)
    }

    /// Iterate over every cell index in row-major order.
    pub fn cell_indices(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            (0..cells.len()).map(move |column| CellIndex::new(row, column))
        })
    }

    /// Whether any cell still lacks OCR text.
    pub fn needs_ocr(&self) -> bool {
        self.cells.iter().flatten().any(|cell| !cell.has_ocr_text())
    }

    /// Whether the cell grid matches the number of grid lines.
    pub fn has_consistent_grid(&self) -> bool {
        self.cells.len() == self.rows.len() + 1
            && self
                .cells
                .iter()
                .all(|row| row.len() == self.columns.len() + 1)
    }

    /// Whether a prediction result has the shape of this table's grid.
    pub fn matches_grid_shape(&self, cells: &[Vec<Cell>]) -> bool {
        cells.len() == self.rows.len() + 1
            && cells.iter().all(|row| row.len() == self.columns.len() + 1)
    }
}
