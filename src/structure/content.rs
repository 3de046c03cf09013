//! Edits that touch cell contents and table metadata but not the grid.

use super::EditError;
use crate::model::{Cell, CellIndex, ColumnType, Table, VirtualValue};

/// Replace all cells with an OCR prediction and lock the structure.
///
/// The prediction must have exactly the table's grid shape.
pub fn apply_content_prediction(table: &Table, cells: Vec<Vec<Cell>>) -> Result<Table, EditError> {
    if !table.matches_grid_shape(&cells) {
        return Err(EditError::ShapeMismatch {
            expected_rows: table.rows.len() + 1,
            expected_columns: table.columns.len() + 1,
        });
    }
    Ok(Table {
        cells,
        structure_locked: true,
        ..table.clone()
    })
}

/// Set the human-corrected text of one cell.
pub fn update_cell_text(table: &Table, index: CellIndex, text: String) -> Result<Table, EditError> {
    let mut new_table = table.clone();
    let cell = new_table
        .cell_mut(index)
        .ok_or(EditError::InvalidIndex {
            what: "cell",
            index: index.row,
        })?;
    cell.human_text = Some(text);
    Ok(new_table)
}

/// Blank the human-corrected text of every cell.
pub fn clear_cell_texts(table: &Table) -> Table {
    let mut new_table = table.clone();
    for cell in new_table.cells.iter_mut().flatten() {
        cell.human_text = Some(String::new());
    }
    new_table
}

/// Replace the semantic tags of one column.
pub fn set_column_types(
    table: &Table,
    column: usize,
    types: Vec<ColumnType>,
) -> Result<Table, EditError> {
    if column >= table.column_count() {
        return Err(EditError::InvalidIndex {
            what: "column",
            index: column,
        });
    }
    let mut new_table = table.clone();
    new_table
        .column_types
        .resize(table.column_count(), Vec::new());
    new_table.column_types[column] = types;
    Ok(new_table)
}

/// Set or clear the structure lock.
pub fn set_locked(table: &Table, locked: bool) -> Table {
    Table {
        structure_locked: locked,
        ..table.clone()
    }
}

/// Append an empty virtual value.
pub fn add_virtual_value(table: &Table) -> Table {
    let mut new_table = table.clone();
    new_table.virtual_values.push(VirtualValue::default());
    new_table
}

/// Choose what a virtual value means.
pub fn set_virtual_value_label(
    table: &Table,
    index: usize,
    label: Option<ColumnType>,
) -> Result<Table, EditError> {
    with_virtual_value(table, index, |v| v.label = label)
}

/// Set the text of a virtual value.
pub fn set_virtual_value(table: &Table, index: usize, value: String) -> Result<Table, EditError> {
    with_virtual_value(table, index, |v| v.value = value)
}

pub fn remove_virtual_value(table: &Table, index: usize) -> Result<Table, EditError> {
    if index >= table.virtual_values.len() {
        return Err(EditError::InvalidIndex {
            what: "virtual value",
            index,
        });
    }
    let mut new_table = table.clone();
    new_table.virtual_values.remove(index);
    Ok(new_table)
}

fn with_virtual_value(
    table: &Table,
    index: usize,
    edit: impl FnOnce(&mut VirtualValue),
) -> Result<Table, EditError> {
    let mut new_table = table.clone();
    let value = new_table
        .virtual_values
        .get_mut(index)
        .ok_or(EditError::InvalidIndex {
            what: "virtual value",
            index,
        })?;
    edit(value);
    Ok(new_table)
}
