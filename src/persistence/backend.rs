//! The collaborator boundary.
//!
//! Image lists, stored tables and predictions come from a [`Backend`]. The
//! annotator state never calls it directly; [`fulfil`] performs a
//! [`Request`] issued by the state and feeds the outcome back.

use crate::model::{Cell, DocumentState, Image, Table};
use crate::persistence::error::PersistenceError;
use crate::state::{AnnotatorState, Request};
use crate::structure::EditError;

/// Source and sink of annotation data.
pub trait Backend {
    /// List the images to annotate, in navigation order.
    fn fetch_images(&mut self) -> Result<Vec<Image>, PersistenceError>;

    /// Load the stored tables of an image. Images without stored tables
    /// yield an empty list.
    fn fetch_tables(&mut self, image_name: &str) -> Result<Vec<Table>, PersistenceError>;

    /// Replace the stored tables of an image.
    fn save_tables(&mut self, image_name: &str, tables: &[Table]) -> Result<(), PersistenceError>;

    /// Store the annotation progress of an image.
    fn save_document_state(
        &mut self,
        image_name: &str,
        state: DocumentState,
    ) -> Result<(), PersistenceError>;

    /// Predict row line offsets for a table without rows.
    fn predict_table_structure(
        &mut self,
        image_name: &str,
        table: &Table,
    ) -> Result<Vec<f32>, PersistenceError>;

    /// Predict the OCR text of every cell. The result has the table's grid
    /// shape.
    fn predict_table_contents(
        &mut self,
        image_name: &str,
        table: &Table,
    ) -> Result<Vec<Vec<Cell>>, PersistenceError>;
}

/// Perform `request` against `backend` and apply the outcome to `state`.
pub fn fulfil(
    state: &mut AnnotatorState,
    backend: &mut dyn Backend,
    request: Request,
) -> Result<(), EditError> {
    match request {
        Request::FetchTables { id, image_name, .. } => {
            let result = backend.fetch_tables(&image_name);
            state.complete_fetch_tables(id, result)
        }
        Request::PredictStructure {
            id,
            image_name,
            table_index,
        } => {
            let result = match state.tables().get(table_index) {
                Some(table) => backend.predict_table_structure(&image_name, table),
                None => Err(PersistenceError::TableNotFound(table_index)),
            };
            state.complete_structure_prediction(id, result)
        }
        Request::PredictContents {
            id,
            image_name,
            table_index,
        } => {
            let result = match state.tables().get(table_index) {
                Some(table) => backend.predict_table_contents(&image_name, table),
                None => Err(PersistenceError::TableNotFound(table_index)),
            };
            state.complete_content_prediction(id, result)
        }
        Request::SaveDocumentState { image_name, state: document_state } => {
            if let Err(e) = backend.save_document_state(&image_name, document_state) {
                log::warn!("Saving document state of {} failed: {}", image_name, e);
            }
            Ok(())
        }
    }
}
