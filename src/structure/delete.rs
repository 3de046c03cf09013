//! Fusing cells by removing grid lines.

use super::EditError;
use crate::model::{Cell, Table};

/// Remove column line `index`, fusing the cells on both sides.
///
/// The fused cell takes the left wall of the left cell, the right wall of
/// the right cell and the top and bottom walls of the left cell. Text is
/// dropped.
pub fn delete_column(table: &Table, index: usize) -> Result<Table, EditError> {
    if index >= table.columns.len() {
        return Err(EditError::InvalidIndex {
            what: "column",
            index,
        });
    }

    let cells = table
        .cells
        .iter()
        .map(|row| {
            let mut fused_row = Vec::with_capacity(row.len().saturating_sub(1));
            let mut cells = row.iter().enumerate();
            while let Some((j, cell)) = cells.next() {
                if j == index {
                    let right = cells.next().map(|(_, c)| c);
                    fused_row.push(Cell {
                        right: right.and_then(|c| c.right),
                        ..cell.without_text()
                    });
                } else {
                    fused_row.push(cell.clone());
                }
            }
            fused_row
        })
        .collect();

    let mut columns = table.columns.clone();
    columns.remove(index);
    let mut column_types = table.column_types.clone();
    if index < column_types.len() {
        column_types.remove(index);
    }

    log::debug!("Deleted column line {}", index);
    Ok(Table {
        columns,
        cells,
        column_types,
        ..table.clone()
    })
}

/// Remove row line `index`, fusing the rows above and below it.
///
/// The fused cell takes the top wall of the upper cell, the bottom wall of
/// the lower cell and the left and right walls of the upper cell.
pub fn delete_row(table: &Table, index: usize) -> Result<Table, EditError> {
    if index >= table.rows.len() {
        return Err(EditError::InvalidIndex { what: "row", index });
    }
    let (Some(upper), Some(lower)) = (table.cells.get(index), table.cells.get(index + 1)) else {
        return Err(EditError::InvalidIndex { what: "row", index });
    };

    let fused: Vec<Cell> = upper
        .iter()
        .zip(lower)
        .map(|(up, down)| Cell {
            bottom: down.bottom,
            ..up.without_text()
        })
        .collect();

    let mut cells = table.cells.clone();
    cells.splice(index..=index + 1, [fused]);
    let mut rows = table.rows.clone();
    rows.remove(index);

    log::debug!("Deleted row line {}", index);
    Ok(Table {
        rows,
        cells,
        ..table.clone()
    })
}
