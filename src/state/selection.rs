//! Mutually exclusive selection of a table and one of its handles.

use serde::{Deserialize, Serialize};

use crate::constants::DELETION_MARKS_REQUIRED;
use crate::model::CellIndex;
use crate::structure::Border;

/// A handle inside the selected table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionTarget {
    /// A whole column line
    Column(usize),
    /// A whole row line
    Row(usize),
    /// The wall between a cell and its right neighbour
    CellColumnLine(CellIndex),
    /// The wall between a cell and the cell below
    CellRowLine(CellIndex),
    /// One side of the outline
    Border(Border),
}

/// Current selection.
///
/// The selected table is the context for `target`; at most one target is set
/// at a time. Any selection change resets the deletion marks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    table: Option<usize>,
    target: Option<SelectionTarget>,
    deletion_marks: u8,
}

impl Selection {
    pub fn table(&self) -> Option<usize> {
        self.table
    }

    pub fn target(&self) -> Option<SelectionTarget> {
        self.target
    }

    pub fn deletion_marks(&self) -> u8 {
        self.deletion_marks
    }

    /// Select a table (or none), dropping any handle selection.
    pub fn select_table(&mut self, table: Option<usize>) {
        self.reset();
        self.table = table;
    }

    /// Select a handle of the current table, replacing any other handle.
    pub fn select_target(&mut self, target: SelectionTarget) {
        self.reset();
        self.target = Some(target);
    }

    /// Drop the handle selection and deletion marks, keeping the table.
    pub fn reset(&mut self) {
        self.target = None;
        self.deletion_marks = 0;
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn reset_deletion_marks(&mut self) {
        self.deletion_marks = 0;
    }

    /// Register one press of the delete gesture.
    ///
    /// Returns `true` once enough marks have been collected; the marks are
    /// then reset.
    pub fn mark_for_deletion(&mut self) -> bool {
        if self.deletion_marks >= DELETION_MARKS_REQUIRED {
            self.deletion_marks = 0;
            true
        } else {
            self.deletion_marks += 1;
            false
        }
    }

    /// Fix up indices after table `removed` was deleted.
    pub(crate) fn table_removed(&mut self, removed: usize) {
        self.table = match self.table {
            Some(t) if t == removed => None,
            Some(t) if t > removed => Some(t - 1),
            other => other,
        };
        self.reset();
    }
}
