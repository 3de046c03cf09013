//! Table-structure engine.
//!
//! Every operation takes a table by reference and returns a new table, so a
//! rejected edit can never leave a half-applied change behind. Positions are
//! in the table's local frame: offsets from the outline's top-left corner.

mod adjust;
mod content;
mod delete;
mod error;
mod insert;
mod validate;

pub use adjust::{
    Border, adjust_border, adjust_cell_column_line, adjust_cell_row_line, adjust_column,
    adjust_row,
};
pub use content::{
    add_virtual_value, apply_content_prediction, clear_cell_texts, remove_virtual_value,
    set_column_types, set_locked, set_virtual_value, set_virtual_value_label, update_cell_text,
};
pub use delete::{delete_column, delete_row};
pub use error::EditError;
pub use insert::{insert_column, insert_row};
pub use validate::validate_table;
