//! Point and rectangle algebra for table geometry.
//!
//! Tables live in an image-local, un-rotated frame. The page on screen may be
//! rotated by a different amount than the one a table was drawn under, so
//! pointer positions are rotated by `table.rotation_degrees - view_rotation`
//! around the page center before they are compared to a table.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::model::{Cell, CellIndex, Table};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Rotate `point` by `degrees` around `center`.
pub fn rotate(point: Point, degrees: f32, center: Point) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let translated = point - center;
    let rotated = Point::new(
        translated.x * cos - translated.y * sin,
        translated.x * sin + translated.y * cos,
    );
    rotated + center
}

/// An axis-aligned rectangle with ordered corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Rectangle {
    /// Normalize two arbitrary corners so that `top_left <= bottom_right`.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self {
            top_left: Point::new(p1.x.min(p2.x), p1.y.min(p2.y)),
            bottom_right: Point::new(p1.x.max(p2.x), p1.y.max(p2.y)),
        }
    }

    pub fn width(&self) -> f32 {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> f32 {
        self.bottom_right.y - self.top_left.y
    }
}

/// Resolve the actual rectangle of a cell in table-local coordinates.
///
/// The base comes from the surrounding grid lines (or the outline edges) and
/// the cell's own wall offsets are added on top. Indices past the grid fall
/// back to the outline edges instead of panicking.
pub fn cell_rectangle(index: CellIndex, table: &Table) -> Rectangle {
    let cell = table.cell(index).cloned().unwrap_or_default();
    cell_rectangle_with(&cell, index, table)
}

/// Like [`cell_rectangle`], but with an explicitly supplied cell.
pub fn cell_rectangle_with(cell: &Cell, index: CellIndex, table: &Table) -> Rectangle {
    let top_base = line_before(&table.rows, index.row);
    let bottom_base = line_after(&table.rows, index.row, table.height());
    let left_base = line_before(&table.columns, index.column);
    let right_base = line_after(&table.columns, index.column, table.width());

    Rectangle::from_corners(
        Point::new(left_base + cell.left_offset(), top_base + cell.top_offset()),
        Point::new(
            right_base + cell.right_offset(),
            bottom_base + cell.bottom_offset(),
        ),
    )
}

fn line_before(lines: &[f32], index: usize) -> f32 {
    index
        .checked_sub(1)
        .and_then(|i| lines.get(i))
        .copied()
        .unwrap_or(0.0)
}

fn line_after(lines: &[f32], index: usize, edge: f32) -> f32 {
    lines.get(index).copied().unwrap_or(edge)
}

/// Largest wall deviation found on either side of one grid line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineRevision {
    /// How far any cell wall bends towards the start (up / left), as a positive magnitude.
    pub negative: f32,
    /// How far any cell wall bends towards the end (down / right).
    pub positive: f32,
}

impl LineRevision {
    fn include(&mut self, offset: f32) {
        if offset < 0.0 {
            self.negative = self.negative.max(-offset);
        } else {
            self.positive = self.positive.max(offset);
        }
    }
}

/// Per-line wall deviations, used to block line handles where a bent cell wall
/// already sits.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaximalRevisions {
    /// One entry per row line.
    pub rows: Vec<LineRevision>,
    /// One entry per column line.
    pub columns: Vec<LineRevision>,
}

/// Collect the maximal positive and negative wall offsets per grid line.
///
/// Row line `i` separates cell rows `i` and `i + 1`; it is bent by the
/// `bottom` offsets of the upper row and the `top` offsets of the lower row.
/// Column lines work the same way with `right` and `left`.
pub fn maximal_revisions(cells: &[Vec<Cell>]) -> MaximalRevisions {
    let row_lines = cells.len().saturating_sub(1);
    let column_lines = cells.first().map_or(0, |row| row.len().saturating_sub(1));

    let mut revisions = MaximalRevisions {
        rows: vec![LineRevision::default(); row_lines],
        columns: vec![LineRevision::default(); column_lines],
    };

    for (i, row) in cells.iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            if let Some(line) = i.checked_sub(1).and_then(|l| revisions.rows.get_mut(l)) {
                line.include(cell.top_offset());
            }
            if let Some(line) = revisions.rows.get_mut(i) {
                line.include(cell.bottom_offset());
            }
            if let Some(line) = j.checked_sub(1).and_then(|l| revisions.columns.get_mut(l)) {
                line.include(cell.left_offset());
            }
            if let Some(line) = revisions.columns.get_mut(j) {
                line.include(cell.right_offset());
            }
        }
    }

    revisions
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
    }

    fn grid_table() -> Table {
        let mut table = Table::new(Point::new(10.0, 10.0), Point::new(110.0, 70.0), 0.0);
        table.columns = vec![40.0, 70.0];
        table.rows = vec![30.0];
        table.cells = vec![vec![Cell::default(); 3]; 2];
        table.column_types = vec![Vec::new(); 3];
        table
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let p = rotate(Point::new(2.0, 1.0), 90.0, Point::new(1.0, 1.0));
        assert!(approx_eq(p, Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let p = Point::new(13.5, -4.0);
        assert!(approx_eq(rotate(p, 0.0, Point::new(100.0, 100.0)), p));
    }

    #[test]
    fn test_rotate_back_and_forth() {
        let center = Point::new(400.0, 600.0);
        let p = Point::new(123.0, 456.0);
        let there = rotate(p, 2.5, center);
        assert!(approx_eq(rotate(there, -2.5, center), p));
    }

    #[test]
    fn test_rectangle_from_corners_sorts() {
        let a = Rectangle::from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        let b = Rectangle::from_corners(Point::new(10.0, 80.0), Point::new(50.0, 20.0));
        assert_eq!(a, b);
        assert_eq!(a.top_left, Point::new(10.0, 20.0));
        assert_eq!(a.width(), 40.0);
        assert_eq!(a.height(), 60.0);
    }

    #[test]
    fn test_cell_rectangle_from_grid_lines() {
        let table = grid_table();
        let first = cell_rectangle(CellIndex::new(0, 0), &table);
        assert_eq!(first.top_left, Point::new(0.0, 0.0));
        assert_eq!(first.bottom_right, Point::new(40.0, 30.0));

        let last = cell_rectangle(CellIndex::new(1, 2), &table);
        assert_eq!(last.top_left, Point::new(70.0, 30.0));
        assert_eq!(last.bottom_right, Point::new(100.0, 60.0));
    }

    #[test]
    fn test_cell_rectangle_applies_offsets() {
        let mut table = grid_table();
        table.cells[0][1].right = Some(5.0);
        table.cells[0][1].bottom = Some(-3.0);
        let rect = cell_rectangle(CellIndex::new(0, 1), &table);
        assert_eq!(rect.top_left, Point::new(40.0, 0.0));
        assert_eq!(rect.bottom_right, Point::new(75.0, 27.0));
    }

    #[test]
    fn test_cell_rectangle_out_of_range_does_not_panic() {
        let table = grid_table();
        let rect = cell_rectangle(CellIndex::new(7, 9), &table);
        assert_eq!(rect.bottom_right, Point::new(100.0, 60.0));
    }

    #[test]
    fn test_maximal_revisions() {
        let mut table = grid_table();
        table.cells[0][0].bottom = Some(4.0);
        table.cells[1][2].top = Some(-6.0);
        table.cells[1][0].right = Some(-2.0);
        table.cells[0][2].left = Some(3.0);

        let revisions = maximal_revisions(&table.cells);
        assert_eq!(revisions.rows.len(), 1);
        assert_eq!(revisions.columns.len(), 2);
        assert_eq!(
            revisions.rows[0],
            LineRevision {
                negative: 6.0,
                positive: 4.0
            }
        );
        assert_eq!(
            revisions.columns[0],
            LineRevision {
                negative: 2.0,
                positive: 0.0
            }
        );
        assert_eq!(
            revisions.columns[1],
            LineRevision {
                negative: 0.0,
                positive: 3.0
            }
        );
    }

    #[test]
    fn test_maximal_revisions_single_cell() {
        let revisions = maximal_revisions(&[vec![Cell::default()]]);
        assert!(revisions.rows.is_empty());
        assert!(revisions.columns.is_empty());
    }
}
