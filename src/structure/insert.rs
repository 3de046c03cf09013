//! Splitting cells by inserting new grid lines.

use super::EditError;
use super::validate::{check_cell_sizes, check_line_spacing};
use crate::model::{Cell, CellIndex, Table};

/// Insert a column line at `position` (offset from the outline's left edge).
///
/// The cell column containing the position is split in two: the left half
/// keeps the original left wall, the right half the original right wall, and
/// both keep the top and bottom offsets. Text of the split cells is dropped.
/// Returns the new table and the index of the inserted line.
pub fn insert_column(table: &Table, position: f32) -> Result<(Table, usize), EditError> {
    if table.columns.contains(&position) {
        return Err(EditError::DuplicateLine { position });
    }

    let index = table.columns.partition_point(|&c| c < position);
    let mut columns = table.columns.clone();
    columns.insert(index, position);
    check_line_spacing(&columns, table.width())?;

    let cells = table
        .cells
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .flat_map(|(j, cell)| {
                    if j == index {
                        vec![
                            Cell {
                                right: None,
                                ..cell.without_text()
                            },
                            Cell {
                                left: None,
                                ..cell.without_text()
                            },
                        ]
                    } else {
                        vec![cell.clone()]
                    }
                })
                .collect()
        })
        .collect();

    let mut column_types = table.column_types.clone();
    column_types.resize(table.column_count(), Vec::new());
    column_types.insert(index, Vec::new());

    let new_table = Table {
        columns,
        cells,
        column_types,
        ..table.clone()
    };
    check_cell_sizes(
        &new_table,
        (0..new_table.row_count())
            .flat_map(|row| [CellIndex::new(row, index), CellIndex::new(row, index + 1)]),
    )?;

    log::debug!("Inserted column line {} at {:.1}", index, position);
    Ok((new_table, index))
}

/// Insert a row line at `position` (offset from the outline's top edge).
///
/// Mirrors [`insert_column`]: the upper half keeps the top wall, the lower
/// half the bottom wall, and both keep the left and right offsets.
pub fn insert_row(table: &Table, position: f32) -> Result<(Table, usize), EditError> {
    if table.rows.contains(&position) {
        return Err(EditError::DuplicateLine { position });
    }

    let index = table.rows.partition_point(|&r| r < position);
    let mut rows = table.rows.clone();
    rows.insert(index, position);
    check_line_spacing(&rows, table.height())?;

    let mut cells = Vec::with_capacity(table.cells.len() + 1);
    for (i, row) in table.cells.iter().enumerate() {
        if i == index {
            cells.push(
                row.iter()
                    .map(|cell| Cell {
                        bottom: None,
                        ..cell.without_text()
                    })
                    .collect(),
            );
            cells.push(
                row.iter()
                    .map(|cell| Cell {
                        top: None,
                        ..cell.without_text()
                    })
                    .collect(),
            );
        } else {
            cells.push(row.clone());
        }
    }

    let new_table = Table {
        rows,
        cells,
        ..table.clone()
    };
    let columns = new_table.column_count();
    check_cell_sizes(
        &new_table,
        [index, index + 1]
            .into_iter()
            .flat_map(|row| (0..columns).map(move |column| CellIndex::new(row, column))),
    )?;

    log::debug!("Inserted row line {} at {:.1}", index, position);
    Ok((new_table, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn empty_table() -> Table {
        Table::new(Point::new(10.0, 10.0), Point::new(110.0, 60.0), 0.0)
    }

    #[test]
    fn test_insert_first_column() {
        let (table, index) = insert_column(&empty_table(), 50.0).expect("insert");
        assert_eq!(index, 0);
        assert_eq!(table.columns, vec![50.0]);
        assert_eq!(table.cells, vec![vec![Cell::default(), Cell::default()]]);
        assert_eq!(table.column_types, vec![Vec::new(), Vec::new()]);
    }

    #[test]
    fn test_insert_column_keeps_sort_order() {
        let (table, _) = insert_column(&empty_table(), 70.0).expect("insert");
        let (table, index) = insert_column(&table, 30.0).expect("insert");
        assert_eq!(index, 0);
        assert_eq!(table.columns, vec![30.0, 70.0]);
        assert_eq!(table.cells[0].len(), 3);
        assert!(table.has_consistent_grid());
    }

    #[test]
    fn test_insert_column_splits_walls_and_drops_text() {
        let mut table = empty_table();
        table.cells[0][0] = Cell {
            top: Some(2.0),
            left: Some(3.0),
            right: Some(-4.0),
            ocr_text: Some("x".to_string()),
            ..Default::default()
        };
        let (table, _) = insert_column(&table, 50.0).expect("insert");
        let left = &table.cells[0][0];
        let right = &table.cells[0][1];
        assert_eq!(left.left, Some(3.0));
        assert_eq!(left.right, None);
        assert_eq!(left.top, Some(2.0));
        assert_eq!(right.left, None);
        assert_eq!(right.right, Some(-4.0));
        assert_eq!(right.top, Some(2.0));
        assert!(left.ocr_text.is_none() && right.ocr_text.is_none());
    }

    #[test]
    fn test_insert_column_rejects_near_edge() {
        let table = empty_table();
        assert!(matches!(
            insert_column(&table, 5.0),
            Err(EditError::LineTooClose { .. })
        ));
        assert!(matches!(
            insert_column(&table, 95.0),
            Err(EditError::LineTooClose { .. })
        ));
    }

    #[test]
    fn test_insert_column_rejects_duplicate() {
        let (table, _) = insert_column(&empty_table(), 50.0).expect("insert");
        assert_eq!(
            insert_column(&table, 50.0),
            Err(EditError::DuplicateLine { position: 50.0 })
        );
    }

    #[test]
    fn test_insert_column_rejects_split_of_bent_cell() {
        let mut table = empty_table();
        table.cells[0][0].left = Some(45.0);
        assert!(matches!(
            insert_column(&table, 50.0),
            Err(EditError::CellTooSmall { .. })
        ));
    }

    #[test]
    fn test_insert_row_splits_middle_row() {
        let (table, _) = insert_row(&empty_table(), 20.0).expect("insert");
        let mut table = table;
        table.cells[1][0].bottom = Some(-2.0);
        table.cells[1][0].human_text = Some("kept?".to_string());
        let (table, index) = insert_row(&table, 35.0).expect("insert");
        assert_eq!(index, 1);
        assert_eq!(table.rows, vec![20.0, 35.0]);
        assert_eq!(table.cells.len(), 3);
        assert_eq!(table.cells[1][0].bottom, None);
        assert_eq!(table.cells[2][0].bottom, Some(-2.0));
        assert!(table.cells[2][0].human_text.is_none());
        assert_eq!(table.column_types.len(), 1);
    }
}
