//! Moving grid lines, single cell walls and outline borders.

use serde::{Deserialize, Serialize};

use super::EditError;
use super::validate::{
    Axis, check_cell_sizes, check_line_position, check_line_spacing, check_room_for_change,
};
use crate::constants::MIN_CELL_SIZE;
use crate::geometry::{Point, cell_rectangle};
use crate::model::{CellIndex, Table};

/// One side of a table outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    Top,
    Right,
    Bottom,
    Left,
}

impl Border {
    /// Map the numeric border index (0 = top, clockwise) to a border.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Border::Top),
            1 => Some(Border::Right),
            2 => Some(Border::Bottom),
            3 => Some(Border::Left),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Border::Top => 0,
            Border::Right => 1,
            Border::Bottom => 2,
            Border::Left => 3,
        }
    }
}

/// Move column line `index` by `change` pixels.
///
/// Every cell on the side the line moves towards must keep the minimum width
/// even after losing `|change|`, and the line must stay clear of its
/// neighbours. Text of the cells on both sides of the line is dropped.
pub fn adjust_column(table: &Table, index: usize, change: f32) -> Result<Table, EditError> {
    adjust_line(table, Axis::Columns, index, change)
}

/// Move row line `index` by `change` pixels. See [`adjust_column`].
pub fn adjust_row(table: &Table, index: usize, change: f32) -> Result<Table, EditError> {
    adjust_line(table, Axis::Rows, index, change)
}

fn adjust_line(table: &Table, axis: Axis, index: usize, change: f32) -> Result<Table, EditError> {
    let lines = axis.lines(table);
    let Some(&position) = lines.get(index) else {
        return Err(EditError::InvalidIndex {
            what: match axis {
                Axis::Columns => "column",
                Axis::Rows => "row",
            },
            index,
        });
    };
    if change == 0.0 {
        return Ok(table.clone());
    }

    let shrinking = if change >= 0.0 { index + 1 } else { index };
    check_room_for_change(table, axis, shrinking, change)?;
    let new_position = position + change;
    check_line_position(lines, index, new_position, axis.extent(table))?;

    let mut new_table = table.clone();
    match axis {
        Axis::Columns => {
            new_table.columns[index] = new_position;
            for row in &mut new_table.cells {
                for cell in row.iter_mut().skip(index).take(2) {
                    cell.clear_text();
                }
            }
        }
        Axis::Rows => {
            new_table.rows[index] = new_position;
            for row in new_table.cells.iter_mut().skip(index).take(2) {
                row.iter_mut().for_each(|cell| cell.clear_text());
            }
        }
    }

    log::debug!(
        "Moved {:?} line {} from {:.1} to {:.1}",
        axis,
        index,
        position,
        new_position
    );
    Ok(new_table)
}

/// Bend the wall between cell `left` and its right neighbour by `change`.
///
/// Only the two cells sharing the wall are touched. Refused when either cell
/// already has a bent top or bottom wall.
pub fn adjust_cell_column_line(
    table: &Table,
    left: CellIndex,
    change: f32,
) -> Result<Table, EditError> {
    let right = CellIndex::new(left.row, left.column + 1);
    adjust_cell_wall(table, Axis::Columns, left, right, change)
}

/// Bend the wall between cell `upper` and the cell below it by `change`.
///
/// Refused when either cell already has a bent left or right wall.
pub fn adjust_cell_row_line(
    table: &Table,
    upper: CellIndex,
    change: f32,
) -> Result<Table, EditError> {
    let lower = CellIndex::new(upper.row + 1, upper.column);
    adjust_cell_wall(table, Axis::Rows, upper, lower, change)
}

fn adjust_cell_wall(
    table: &Table,
    axis: Axis,
    first: CellIndex,
    second: CellIndex,
    change: f32,
) -> Result<Table, EditError> {
    let (Some(first_cell), Some(second_cell)) = (table.cell(first), table.cell(second)) else {
        return Err(EditError::InvalidIndex {
            what: "cell",
            index: match axis {
                Axis::Columns => first.column,
                Axis::Rows => first.row,
            },
        });
    };
    if change == 0.0 {
        return Ok(table.clone());
    }

    for (index, cell) in [(first, first_cell), (second, second_cell)] {
        let conflicting = match axis {
            Axis::Columns => cell.has_horizontal_wall_offset(),
            Axis::Rows => cell.has_vertical_wall_offset(),
        };
        if conflicting {
            return Err(EditError::ConflictingOffset {
                row: index.row,
                column: index.column,
            });
        }
    }

    let size = |index: CellIndex| {
        let rect = cell_rectangle(index, table);
        match axis {
            Axis::Columns => rect.width(),
            Axis::Rows => rect.height(),
        }
    };
    let first_size = size(first) + change;
    let second_size = size(second) - change;
    for (index, size) in [(first, first_size), (second, second_size)] {
        if size < MIN_CELL_SIZE {
            return Err(EditError::CellTooSmall {
                row: index.row,
                column: index.column,
                size,
            });
        }
    }

    let mut new_table = table.clone();
    if let Some(cell) = new_table.cell_mut(first) {
        match axis {
            Axis::Columns => cell.right = Some(cell.right_offset() + change),
            Axis::Rows => cell.bottom = Some(cell.bottom_offset() + change),
        }
        cell.clear_text();
    }
    if let Some(cell) = new_table.cell_mut(second) {
        match axis {
            Axis::Columns => cell.left = Some(cell.left_offset() + change),
            Axis::Rows => cell.top = Some(cell.top_offset() + change),
        }
        cell.clear_text();
    }

    log::debug!(
        "Bent {:?} wall after cell ({}, {}) by {:.1}",
        axis,
        first.row,
        first.column,
        change
    );
    Ok(new_table)
}

/// Move one side of the outline by `change` pixels.
///
/// Moving the top or left side re-bases the row or column lines so that they
/// keep their position on the page. Text of the cells along the moved side is
/// dropped. The resulting table is rejected when a line comes too close to
/// an edge, an edge cell becomes too small, or the outline leaves the
/// `image_width` x `image_height` page.
pub fn adjust_border(
    table: &Table,
    border: Border,
    change: f32,
    image_width: u32,
    image_height: u32,
) -> Result<Table, EditError> {
    if change == 0.0 {
        return Ok(table.clone());
    }

    let mut candidate = table.clone();
    let last_row = table.row_count().saturating_sub(1);
    let last_column = table.column_count().saturating_sub(1);
    match border {
        Border::Top => {
            candidate.outline.top_left.y += change;
            candidate.rows.iter_mut().for_each(|r| *r -= change);
            if let Some(row) = candidate.cells.first_mut() {
                row.iter_mut().for_each(|cell| cell.clear_text());
            }
        }
        Border::Right => {
            candidate.outline.bottom_right.x += change;
            for row in &mut candidate.cells {
                if let Some(cell) = row.get_mut(last_column) {
                    cell.clear_text();
                }
            }
        }
        Border::Bottom => {
            candidate.outline.bottom_right.y += change;
            if let Some(row) = candidate.cells.get_mut(last_row) {
                row.iter_mut().for_each(|cell| cell.clear_text());
            }
        }
        Border::Left => {
            candidate.outline.top_left.x += change;
            candidate.columns.iter_mut().for_each(|c| *c -= change);
            for row in &mut candidate.cells {
                if let Some(cell) = row.first_mut() {
                    cell.clear_text();
                }
            }
        }
    }

    check_line_spacing(&candidate.rows, candidate.height())?;
    check_line_spacing(&candidate.columns, candidate.width())?;

    let columns = candidate.column_count();
    let rows = candidate.row_count();
    let edge_cells = [0, last_row]
        .into_iter()
        .flat_map(|row| (0..columns).map(move |column| CellIndex::new(row, column)))
        .chain(
            [0, last_column]
                .into_iter()
                .flat_map(|column| (0..rows).map(move |row| CellIndex::new(row, column))),
        );
    check_cell_sizes(&candidate, edge_cells)?;

    let inside = |p: Point| {
        p.x >= 0.0 && p.y >= 0.0 && p.x < image_width as f32 && p.y <= image_height as f32
    };
    if !inside(candidate.outline.top_left) || !inside(candidate.outline.bottom_right) {
        return Err(EditError::OutOfImageBounds);
    }

    log::debug!("Moved {:?} border by {:.1}", border, change);
    Ok(candidate)
}
