//! Data models for the table annotator.

mod cell;
mod column_type;
mod image;
mod table;

pub use cell::{Cell, CellIndex};
pub use column_type::ColumnType;
pub use image::{DocumentState, Image, TemporaryImageParameters};
pub use table::{Table, UnfinishedTable, VirtualValue};
