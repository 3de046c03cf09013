//! Size and ordering checks shared by the structural edits.

use super::EditError;
use crate::constants::MIN_CELL_SIZE;
use crate::geometry::cell_rectangle;
use crate::model::{CellIndex, Table};

/// Axis a grid line runs across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    /// Column lines, measured along x
    Columns,
    /// Row lines, measured along y
    Rows,
}

impl Axis {
    pub(crate) fn lines(self, table: &Table) -> &[f32] {
        match self {
            Axis::Columns => &table.columns,
            Axis::Rows => &table.rows,
        }
    }

    /// Outline extent along this axis.
    pub(crate) fn extent(self, table: &Table) -> f32 {
        match self {
            Axis::Columns => table.width(),
            Axis::Rows => table.height(),
        }
    }
}

/// Check that `lines` is strictly increasing with every line at least
/// [`MIN_CELL_SIZE`] away from its neighbours, from zero and from `extent`.
pub(crate) fn check_line_spacing(lines: &[f32], extent: f32) -> Result<(), EditError> {
    let mut previous = 0.0;
    for &position in lines {
        if position - previous < MIN_CELL_SIZE {
            return Err(EditError::LineTooClose {
                position,
                neighbour: previous,
            });
        }
        previous = position;
    }
    if extent - previous < MIN_CELL_SIZE {
        return Err(EditError::LineTooClose {
            position: previous,
            neighbour: extent,
        });
    }
    Ok(())
}

/// Check the position of a single moved line against its neighbours.
pub(crate) fn check_line_position(
    lines: &[f32],
    index: usize,
    position: f32,
    extent: f32,
) -> Result<(), EditError> {
    let previous = index
        .checked_sub(1)
        .and_then(|i| lines.get(i))
        .copied()
        .unwrap_or(0.0);
    let next = lines.get(index + 1).copied().unwrap_or(extent);

    if position - previous < MIN_CELL_SIZE {
        return Err(EditError::LineTooClose {
            position,
            neighbour: previous,
        });
    }
    if next - position < MIN_CELL_SIZE {
        return Err(EditError::LineTooClose {
            position,
            neighbour: next,
        });
    }
    Ok(())
}

/// Check that every given cell is at least [`MIN_CELL_SIZE`] wide and high.
pub(crate) fn check_cell_sizes(
    table: &Table,
    cells: impl IntoIterator<Item = CellIndex>,
) -> Result<(), EditError> {
    for index in cells {
        let rect = cell_rectangle(index, table);
        let size = rect.width().min(rect.height());
        if size < MIN_CELL_SIZE {
            return Err(EditError::CellTooSmall {
                row: index.row,
                column: index.column,
                size,
            });
        }
    }
    Ok(())
}

/// Check that the cells of one row or column keep the minimum size when a
/// line bordering them moves by `change` in either direction.
pub(crate) fn check_room_for_change(
    table: &Table,
    axis: Axis,
    index: usize,
    change: f32,
) -> Result<(), EditError> {
    let cells: Vec<CellIndex> = match axis {
        Axis::Columns => (0..table.row_count())
            .map(|row| CellIndex::new(row, index))
            .collect(),
        Axis::Rows => (0..table.column_count())
            .map(|column| CellIndex::new(index, column))
            .collect(),
    };

    for cell in cells {
        let rect = cell_rectangle(cell, table);
        let size = match axis {
            Axis::Columns => rect.width(),
            Axis::Rows => rect.height(),
        };
        if size - change.abs() < MIN_CELL_SIZE {
            return Err(EditError::CellTooSmall {
                row: cell.row,
                column: cell.column,
                size: size - change.abs(),
            });
        }
    }
    Ok(())
}

/// Check every structural invariant of a table.
pub fn validate_table(table: &Table) -> Result<(), EditError> {
    if !table.has_consistent_grid() {
        return Err(EditError::ShapeMismatch {
            expected_rows: table.rows.len() + 1,
            expected_columns: table.columns.len() + 1,
        });
    }
    check_line_spacing(&table.columns, table.width())?;
    check_line_spacing(&table.rows, table.height())?;
    check_cell_sizes(table, table.cell_indices())
}
