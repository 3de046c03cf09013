//! The annotator state container.
//!
//! Owns the image list, the tables of the current image, the selection and
//! all mode flags. Every user action goes through a method here (or through
//! [`AnnotatorState::update`]); rejected actions return an [`EditError`] and
//! leave the state untouched.

use std::fmt::Display;
use std::time::Duration;

use web_time::Instant;

use super::drag::DragState;
use super::requests::{PendingFetch, PendingPrediction, Request, RequestTracker};
use super::saved_indicator::SavedIndicator;
use super::selection::{Selection, SelectionTarget};
use crate::constants::{DRAG_START_DELAY, HANDLE_OFFSET, MIN_CELL_SIZE, SAVED_INDICATOR_DURATION};
use crate::geometry::{Point, cell_rectangle, rotate};
use crate::message::Message;
use crate::model::{Cell, CellIndex, ColumnType, DocumentState, Image, Table, UnfinishedTable};
use crate::structure::{self, Border, EditError};

/// Tunables of the interactive engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Subtracted from pointer positions when mapping them onto lines.
    pub handle_offset: f32,
    /// Pointer moves are ignored for this long after a drag starts.
    pub drag_start_delay: Duration,
    /// How long the saved indicator stays on.
    pub saved_indicator_duration: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            handle_offset: HANDLE_OFFSET,
            drag_start_delay: DRAG_START_DELAY,
            saved_indicator_duration: SAVED_INDICATOR_DURATION,
        }
    }
}

/// A pending grid edit derived from the pointer during a drag.
enum DragEdit {
    Column(f32),
    Row(f32),
    Border(f32),
}

/// The whole interactive state of the annotator.
#[derive(Debug, Clone)]
pub struct AnnotatorState {
    settings: EngineSettings,
    images: Vec<Image>,
    current_image_index: usize,
    tables: Vec<Table>,
    unfinished_table: Option<UnfinishedTable>,
    selection: Selection,
    new_column_position: Option<f32>,
    new_row_position: Option<f32>,
    pointer_position: Point,
    document_position: Option<Point>,
    drag: DragState,
    /// Display rotation of the page, independent of each table's own rotation.
    rotation_degrees: f32,
    ocr_view: bool,
    requests: RequestTracker,
    saved_indicator: SavedIndicator,
    /// Bumped on every user change to `tables`.
    tables_revision: u64,
}

impl Default for AnnotatorState {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl AnnotatorState {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            images: Vec::new(),
            current_image_index: 0,
            tables: Vec::new(),
            unfinished_table: None,
            selection: Selection::default(),
            new_column_position: None,
            new_row_position: None,
            pointer_position: Point::default(),
            document_position: None,
            drag: DragState::default(),
            rotation_degrees: 0.0,
            ocr_view: false,
            requests: RequestTracker::default(),
            saved_indicator: SavedIndicator::new(settings.saved_indicator_duration),
            tables_revision: 0,
        }
    }

    // === Accessors ===

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn current_image_index(&self) -> usize {
        self.current_image_index
    }

    pub fn current_image(&self) -> Option<&Image> {
        self.images.get(self.current_image_index)
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn selected_table(&self) -> Option<&Table> {
        self.tables.get(self.selection.table()?)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn unfinished_table(&self) -> Option<&UnfinishedTable> {
        self.unfinished_table.as_ref()
    }

    pub fn new_column_position(&self) -> Option<f32> {
        self.new_column_position
    }

    pub fn new_row_position(&self) -> Option<f32> {
        self.new_row_position
    }

    pub fn rotation_degrees(&self) -> f32 {
        self.rotation_degrees
    }

    pub fn document_position(&self) -> Option<Point> {
        self.document_position
    }

    pub fn pointer_position(&self) -> Point {
        self.pointer_position
    }

    pub fn ocr_view(&self) -> bool {
        self.ocr_view
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn is_running_ocr(&self) -> bool {
        self.requests.ocr.is_some()
    }

    pub fn is_running_segmentation(&self) -> bool {
        self.requests.segmentation.is_some()
    }

    pub fn tables_revision(&self) -> u64 {
        self.tables_revision
    }

    pub fn is_saved_indicator_visible(&self, now: Instant) -> bool {
        self.saved_indicator.is_visible(now)
    }

    // === Message dispatch ===

    /// Apply one message.
    ///
    /// Returns the collaborator call the message started, if any.
    pub fn update(&mut self, message: Message, now: Instant) -> Result<Option<Request>, EditError> {
        let name = message.name();
        let result = match message {
            Message::SelectImage(index) => self.select_image(index).map(Some),
            Message::PreviousImage => self.previous_image().map(Some),
            Message::NextImage => self.next_image().map(Some),
            Message::RotateView(degrees) => {
                self.rotate_view(degrees);
                Ok(None)
            }
            Message::SetViewRotation(degrees) => {
                self.set_view_rotation(degrees);
                Ok(None)
            }
            Message::PointerMoved(point) => self.pointer_moved(point, now).map(|_| None),
            Message::DocumentMoved(point) => {
                self.document_position = Some(point);
                Ok(None)
            }
            Message::SetDocumentState(state) => self.set_document_state(state).map(Some),
            Message::OutlineTable(point) => self.outline_table(point).map(|_| None),
            Message::CancelActions => {
                self.cancel_actions();
                Ok(None)
            }
            Message::SelectTable(index) => self.select_table(index).map(|_| None),
            Message::DeleteTable => self.delete_table().map(|_| None),
            Message::DeleteSelected => self.delete_selected().map(|_| None),
            Message::LockTable(lock) => self.lock_table(lock).map(|_| None),
            Message::Select(target) => self.select(target).map(|_| None),
            Message::ResetSelection => {
                self.selection.reset();
                Ok(None)
            }
            Message::PreviewColumn(point) => self.preview_column(point).map(|_| None),
            Message::PreviewRow(point) => self.preview_row(point).map(|_| None),
            Message::AddColumn(position) => self.add_column(position).map(|_| None),
            Message::AddRow(position) => self.add_row(position).map(|_| None),
            Message::DeleteColumn => self.delete_column().map(|_| None),
            Message::DeleteRow => self.delete_row().map(|_| None),
            Message::AdjustColumn(change) => self.adjust_column(change).map(|_| None),
            Message::AdjustRow(change) => self.adjust_row(change).map(|_| None),
            Message::AdjustBorder(change) => self.adjust_border(change).map(|_| None),
            Message::DragStarted(target) => self.begin_drag(target, now).map(|_| None),
            Message::DragEnded => {
                self.drag.end();
                Ok(None)
            }
            Message::SegmentTable => self.segment_table().map(Some),
            Message::PredictTableContent => self.predict_table_content().map(Some),
            Message::SetOcrView(on) => self.set_ocr_view(on),
            Message::UpdateCellText { cell, text } => {
                self.update_cell_text(cell, text).map(|_| None)
            }
            Message::ClearCellTexts => self.clear_cell_texts().map(|_| None),
            Message::SetColumnTypes { column, types } => {
                self.set_column_types(column, types).map(|_| None)
            }
            Message::AddVirtualValue => self.add_virtual_value().map(|_| None),
            Message::SetVirtualValueLabel { index, label } => {
                self.set_virtual_value_label(index, label).map(|_| None)
            }
            Message::SetVirtualValue { index, value } => {
                self.set_virtual_value(index, value).map(|_| None)
            }
            Message::RemoveVirtualValue(index) => self.remove_virtual_value(index).map(|_| None),
        };

        match &result {
            Ok(_) => log::trace!("Applied {}", name),
            Err(e) => log::debug!("Rejected {}: {}", name, e),
        }
        result
    }

    // === Images and navigation ===

    /// Replace the image list and start loading the first image, or the one
    /// with the given document id.
    pub fn load_images(
        &mut self,
        images: Vec<Image>,
        doc_id: Option<&str>,
    ) -> Result<Option<Request>, EditError> {
        let index = doc_id
            .and_then(|id| images.iter().position(|i| i.doc_id.as_deref() == Some(id)))
            .unwrap_or(0);
        log::info!("Loaded {} images", images.len());
        self.images = images;
        if self.images.is_empty() {
            return Ok(None);
        }
        self.select_image(index).map(Some)
    }

    /// Start switching to image `index`.
    ///
    /// The switch itself happens when the tables of that image arrive through
    /// [`complete_fetch_tables`](Self::complete_fetch_tables).
    pub fn select_image(&mut self, index: usize) -> Result<Request, EditError> {
        self.check_can_navigate()?;
        let image = self.images.get(index).ok_or(EditError::InvalidIndex {
            what: "image",
            index,
        })?;
        let image_name = image.name.clone();
        let id = self.requests.next_id();
        self.requests.fetch = Some(PendingFetch {
            id,
            image_index: index,
        });
        log::debug!("Fetching tables of {}", image_name);
        Ok(Request::FetchTables {
            id,
            image_index: index,
            image_name,
        })
    }

    pub fn previous_image(&mut self) -> Result<Request, EditError> {
        let index = self
            .current_image_index
            .checked_sub(1)
            .ok_or(EditError::PreconditionNotMet("already at the first image"))?;
        self.select_image(index)
    }

    pub fn next_image(&mut self) -> Result<Request, EditError> {
        self.select_image(self.current_image_index + 1)
    }

    /// Apply the outcome of a table fetch.
    ///
    /// A failed fetch leaves everything as it was.
    pub fn complete_fetch_tables<E: Display>(
        &mut self,
        id: u64,
        result: Result<Vec<Table>, E>,
    ) -> Result<(), EditError> {
        let pending = RequestTracker::take_matching(&mut self.requests.fetch, id, |p| p.id)
            .ok_or(EditError::StaleRequest { id })?;
        let tables = match result {
            Ok(tables) => tables,
            Err(e) => {
                log::warn!("Fetching tables failed: {}", e);
                return Ok(());
            }
        };
        self.check_can_navigate()?;

        self.selection.clear();
        self.current_image_index = pending.image_index;
        self.rotation_degrees = 0.0;
        self.document_position = None;
        self.tables = tables;
        self.unfinished_table = None;
        self.new_column_position = None;
        self.new_row_position = None;
        self.drag.end();
        log::info!(
            "Switched to image {} with {} tables",
            pending.image_index,
            self.tables.len()
        );
        Ok(())
    }

    fn check_can_navigate(&self) -> Result<(), EditError> {
        if self.ocr_view {
            return Err(EditError::OcrViewActive);
        }
        if self.requests.is_predicting() {
            return Err(EditError::OperationInProgress);
        }
        Ok(())
    }

    /// Rotate the page view. Tables keep their own rotation.
    pub fn rotate_view(&mut self, degrees: f32) {
        self.rotation_degrees += degrees;
    }

    pub fn set_view_rotation(&mut self, degrees: f32) {
        self.rotation_degrees = degrees;
    }

    pub fn set_document_position(&mut self, position: Point) {
        self.document_position = Some(position);
    }

    /// Record the annotation progress of the current image.
    pub fn set_document_state(&mut self, state: DocumentState) -> Result<Request, EditError> {
        let image = self
            .images
            .get_mut(self.current_image_index)
            .ok_or(EditError::PreconditionNotMet("no image loaded"))?;
        image.document_state = state;
        image.finished = state == DocumentState::Done;
        log::info!("Marked {} as '{}'", image.name, state.name());
        Ok(Request::SaveDocumentState {
            image_name: image.name.clone(),
            state,
        })
    }

    // === Tables ===

    /// Place a corner of a new table outline.
    ///
    /// The first call remembers the point; the second creates a single-cell
    /// table with the current view rotation and selects it.
    pub fn outline_table(&mut self, point: Point) -> Result<(), EditError> {
        if self.ocr_view {
            return Err(EditError::OcrViewActive);
        }
        let Some(unfinished) = self.unfinished_table else {
            self.unfinished_table = Some(UnfinishedTable { first_point: point });
            return Ok(());
        };

        let table = Table::new(unfinished.first_point, point, self.rotation_degrees);
        let size = table.width().min(table.height());
        if size < MIN_CELL_SIZE {
            return Err(EditError::CellTooSmall {
                row: 0,
                column: 0,
                size,
            });
        }

        self.unfinished_table = None;
        self.tables.push(table);
        self.tables_revision += 1;
        self.select_table(Some(self.tables.len() - 1))?;
        log::info!("Created table {}", self.tables.len() - 1);
        Ok(())
    }

    /// Abort an outline in progress and forget deletion marks.
    pub fn cancel_actions(&mut self) {
        self.unfinished_table = None;
        self.selection.reset_deletion_marks();
    }

    pub fn select_table(&mut self, index: Option<usize>) -> Result<(), EditError> {
        match index {
            Some(index) if index >= self.tables.len() => {
                return Err(EditError::InvalidIndex {
                    what: "table",
                    index,
                });
            }
            _ => {}
        }
        self.selection.select_table(index);
        self.new_column_position = None;
        self.new_row_position = None;
        Ok(())
    }

    /// Press the delete gesture on the selected table.
    ///
    /// The first presses only mark the table; the table goes away once enough
    /// marks have been collected without any other action in between.
    pub fn delete_table(&mut self) -> Result<(), EditError> {
        if self.ocr_view {
            return Err(EditError::OcrViewActive);
        }
        let index = self.selected_index()?;
        if self.tables[index].structure_locked {
            return Err(EditError::StructureLocked);
        }
        if self.requests.is_predicting() {
            return Err(EditError::OperationInProgress);
        }

        if self.selection.mark_for_deletion() {
            self.tables.remove(index);
            self.selection.table_removed(index);
            self.tables_revision += 1;
            log::info!("Deleted table {}", index);
        } else {
            log::debug!(
                "Table {} marked for deletion ({})",
                index,
                self.selection.deletion_marks()
            );
        }
        Ok(())
    }

    /// Delete the selected line, or press the delete gesture on the table
    /// when no handle is selected.
    pub fn delete_selected(&mut self) -> Result<(), EditError> {
        match self.selection.target() {
            Some(SelectionTarget::Column(_)) => self.delete_column(),
            Some(SelectionTarget::Row(_)) => self.delete_row(),
            Some(_) => Err(EditError::PreconditionNotMet(
                "cell walls and borders cannot be deleted",
            )),
            None => self.delete_table(),
        }
    }

    pub fn lock_table(&mut self, lock: bool) -> Result<(), EditError> {
        let index = self.selected_index()?;
        let table = structure::set_locked(&self.tables[index], lock);
        self.commit(index, table);
        self.selection.reset();
        log::info!(
            "{} table {}",
            if lock { "Locked" } else { "Unlocked" },
            index
        );
        Ok(())
    }

    // === Grid ===

    /// Select a handle of the selected table.
    pub fn select(&mut self, target: SelectionTarget) -> Result<(), EditError> {
        let index = self.selected_index()?;
        let table = &self.tables[index];
        let valid = match target {
            SelectionTarget::Column(i) => i < table.columns.len(),
            SelectionTarget::Row(i) => i < table.rows.len(),
            SelectionTarget::CellColumnLine(cell) => {
                table.cell(cell).is_some() && cell.column + 1 < table.column_count()
            }
            SelectionTarget::CellRowLine(cell) => {
                table.cell(cell).is_some() && cell.row + 1 < table.row_count()
            }
            SelectionTarget::Border(_) => true,
        };
        if !valid {
            return Err(EditError::PreconditionNotMet("no such handle"));
        }
        self.selection.select_target(target);
        Ok(())
    }

    /// Move the new-column preview under a page position, or hide it.
    pub fn preview_column(&mut self, page_point: Option<Point>) -> Result<(), EditError> {
        let Some(page_point) = page_point else {
            self.new_column_position = None;
            return Ok(());
        };
        if self.drag.is_dragging() {
            return Ok(());
        }
        let local = self.selected_table_point(page_point)?;
        self.new_column_position = Some((local.x - self.settings.handle_offset).round());
        Ok(())
    }

    /// Move the new-row preview under a page position, or hide it.
    pub fn preview_row(&mut self, page_point: Option<Point>) -> Result<(), EditError> {
        let Some(page_point) = page_point else {
            self.new_row_position = None;
            return Ok(());
        };
        if self.drag.is_dragging() {
            return Ok(());
        }
        let local = self.selected_table_point(page_point)?;
        self.new_row_position = Some((local.y - self.settings.handle_offset).round());
        Ok(())
    }

    /// Insert a column line at `position`, or at the preview position.
    pub fn add_column(&mut self, position: Option<f32>) -> Result<(), EditError> {
        let (index, table) = self.editable_table()?;
        let position = position
            .or(self.new_column_position)
            .ok_or(EditError::PreconditionNotMet("no column position"))?;
        let (table, _) = structure::insert_column(table, position)?;
        self.commit(index, table);
        Ok(())
    }

    /// Insert a row line at `position`, or at the preview position.
    pub fn add_row(&mut self, position: Option<f32>) -> Result<(), EditError> {
        let (index, table) = self.editable_table()?;
        let position = position
            .or(self.new_row_position)
            .ok_or(EditError::PreconditionNotMet("no row position"))?;
        let (table, _) = structure::insert_row(table, position)?;
        self.commit(index, table);
        Ok(())
    }

    /// Remove the selected column line.
    pub fn delete_column(&mut self) -> Result<(), EditError> {
        let (index, table) = self.editable_table()?;
        let Some(SelectionTarget::Column(column)) = self.selection.target() else {
            return Err(EditError::PreconditionNotMet("no column selected"));
        };
        let table = structure::delete_column(table, column)?;
        self.commit(index, table);
        self.selection.reset();
        Ok(())
    }

    /// Remove the selected row line.
    pub fn delete_row(&mut self) -> Result<(), EditError> {
        let (index, table) = self.editable_table()?;
        let Some(SelectionTarget::Row(row)) = self.selection.target() else {
            return Err(EditError::PreconditionNotMet("no row selected"));
        };
        let table = structure::delete_row(table, row)?;
        self.commit(index, table);
        self.selection.reset();
        Ok(())
    }

    /// Move the selected column line or vertical cell wall.
    pub fn adjust_column(&mut self, change: f32) -> Result<(), EditError> {
        let (index, table) = self.editable_table()?;
        let table = match self.selection.target() {
            Some(SelectionTarget::Column(column)) => {
                structure::adjust_column(table, column, change)?
            }
            Some(SelectionTarget::CellColumnLine(cell)) => {
                structure::adjust_cell_column_line(table, cell, change)?
            }
            _ => return Err(EditError::PreconditionNotMet("no column line selected")),
        };
        if change != 0.0 {
            self.commit(index, table);
        }
        Ok(())
    }

    /// Move the selected row line or horizontal cell wall.
    pub fn adjust_row(&mut self, change: f32) -> Result<(), EditError> {
        let (index, table) = self.editable_table()?;
        let table = match self.selection.target() {
            Some(SelectionTarget::Row(row)) => structure::adjust_row(table, row, change)?,
            Some(SelectionTarget::CellRowLine(cell)) => {
                structure::adjust_cell_row_line(table, cell, change)?
            }
            _ => return Err(EditError::PreconditionNotMet("no row line selected")),
        };
        if change != 0.0 {
            self.commit(index, table);
        }
        Ok(())
    }

    /// Move the selected outline border.
    pub fn adjust_border(&mut self, change: f32) -> Result<(), EditError> {
        let (index, table) = self.editable_table()?;
        let Some(SelectionTarget::Border(border)) = self.selection.target() else {
            return Err(EditError::PreconditionNotMet("no border selected"));
        };
        let image = self
            .current_image()
            .ok_or(EditError::PreconditionNotMet("no image loaded"))?;
        let table = structure::adjust_border(table, border, change, image.width, image.height)?;
        if change != 0.0 {
            self.commit(index, table);
        }
        Ok(())
    }

    // === Dragging ===

    /// Pointer pressed on a handle: select it and start dragging.
    pub fn begin_drag(&mut self, target: SelectionTarget, now: Instant) -> Result<(), EditError> {
        self.select(target)?;
        self.drag.begin(now);
        Ok(())
    }

    pub fn end_drag(&mut self) {
        self.drag.end();
    }

    /// Record the pointer position and, while dragging, move the dragged
    /// handle under it.
    pub fn pointer_moved(&mut self, point: Point, now: Instant) -> Result<(), EditError> {
        self.pointer_position = point;
        if !self
            .drag
            .should_apply(now, self.settings.drag_start_delay)
        {
            return Ok(());
        }
        let Some(edit) = self.drag_edit()? else {
            return Ok(());
        };
        match edit {
            DragEdit::Column(change) => self.adjust_column(change),
            DragEdit::Row(change) => self.adjust_row(change),
            DragEdit::Border(change) => self.adjust_border(change),
        }
    }

    /// Derive the edit that brings the dragged handle under the pointer.
    fn drag_edit(&self) -> Result<Option<DragEdit>, EditError> {
        let Some(target) = self.selection.target() else {
            return Ok(None);
        };
        let index = self.selected_index()?;
        let table = &self.tables[index];
        let local = self.table_point(table, self.pointer_position)?;
        let offset = self.settings.handle_offset;

        let line = |lines: &[f32], i: usize, what: &'static str| {
            lines
                .get(i)
                .copied()
                .ok_or(EditError::InvalidIndex { what, index: i })
        };
        let edit = match target {
            SelectionTarget::Column(i) => {
                DragEdit::Column(local.x - line(&table.columns, i, "column")? - offset)
            }
            SelectionTarget::Row(i) => {
                DragEdit::Row(local.y - line(&table.rows, i, "row")? - offset)
            }
            SelectionTarget::CellColumnLine(cell) => {
                let wall = cell_rectangle(cell, table).bottom_right.x;
                DragEdit::Column(local.x - wall - offset)
            }
            SelectionTarget::CellRowLine(cell) => {
                let wall = cell_rectangle(cell, table).bottom_right.y;
                DragEdit::Row(local.y - wall - offset)
            }
            SelectionTarget::Border(Border::Top) => DragEdit::Border(local.y - offset),
            SelectionTarget::Border(Border::Right) => {
                DragEdit::Border(local.x - table.width() - offset)
            }
            SelectionTarget::Border(Border::Bottom) => {
                DragEdit::Border(local.y - table.height() - offset)
            }
            SelectionTarget::Border(Border::Left) => DragEdit::Border(local.x - offset),
        };
        Ok(Some(edit))
    }

    // === Predictions and OCR ===

    /// Ask for row lines of the selected table, which must not have any yet.
    pub fn segment_table(&mut self) -> Result<Request, EditError> {
        let (index, table) = self.editable_table()?;
        if !table.rows.is_empty() {
            return Err(EditError::PreconditionNotMet("table already has rows"));
        }
        if self.requests.is_predicting() {
            return Err(EditError::OperationInProgress);
        }
        let image_name = self.current_image_name()?;

        self.selection.reset();
        let id = self.requests.next_id();
        self.requests.segmentation = Some(PendingPrediction {
            id,
            table_index: index,
            enter_ocr_view: false,
        });
        log::info!("Segmenting table {} of {}", index, image_name);
        Ok(Request::PredictStructure {
            id,
            image_name,
            table_index: index,
        })
    }

    /// Apply predicted row lines.
    ///
    /// Each row goes through the normal insertion checks; rows that fail them
    /// are skipped.
    pub fn complete_structure_prediction<E: Display>(
        &mut self,
        id: u64,
        result: Result<Vec<f32>, E>,
    ) -> Result<(), EditError> {
        let pending = RequestTracker::take_matching(&mut self.requests.segmentation, id, |p| p.id)
            .ok_or(EditError::StaleRequest { id })?;
        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("Structure prediction failed: {}", e);
                return Ok(());
            }
        };
        let mut table = match self.structure_editable(pending.table_index) {
            Ok(table) => table.clone(),
            Err(e) => {
                log::warn!(
                    "Dropping predicted rows for table {}: {}",
                    pending.table_index,
                    e
                );
                return Err(e);
            }
        };

        let mut added = 0;
        for row in rows {
            match structure::insert_row(&table, row) {
                Ok((updated, _)) => {
                    table = updated;
                    added += 1;
                }
                Err(e) => log::debug!("Skipping predicted row at {:.1}: {}", row, e),
            }
        }
        if added > 0 {
            self.commit(pending.table_index, table);
        }
        log::info!(
            "Added {} predicted rows to table {}",
            added,
            pending.table_index
        );
        Ok(())
    }

    /// Ask for the cell contents of the selected table.
    pub fn predict_table_content(&mut self) -> Result<Request, EditError> {
        self.start_content_prediction(false)
    }

    fn start_content_prediction(&mut self, enter_ocr_view: bool) -> Result<Request, EditError> {
        let index = self.selected_index()?;
        if !self.tables[index].needs_ocr() {
            return Err(EditError::PreconditionNotMet("table already has OCR text"));
        }
        if self.requests.is_predicting() {
            return Err(EditError::OperationInProgress);
        }
        let image_name = self.current_image_name()?;

        self.selection.reset();
        let id = self.requests.next_id();
        self.requests.ocr = Some(PendingPrediction {
            id,
            table_index: index,
            enter_ocr_view,
        });
        log::info!("Running OCR on table {} of {}", index, image_name);
        Ok(Request::PredictContents {
            id,
            image_name,
            table_index: index,
        })
    }

    /// Apply predicted cell contents and lock the table.
    pub fn complete_content_prediction<E: Display>(
        &mut self,
        id: u64,
        result: Result<Vec<Vec<Cell>>, E>,
    ) -> Result<(), EditError> {
        let pending = RequestTracker::take_matching(&mut self.requests.ocr, id, |p| p.id)
            .ok_or(EditError::StaleRequest { id })?;
        let cells = match result {
            Ok(cells) => cells,
            Err(e) => {
                log::warn!("Content prediction failed: {}", e);
                return Ok(());
            }
        };
        let table = self
            .tables
            .get(pending.table_index)
            .ok_or(EditError::InvalidIndex {
                what: "table",
                index: pending.table_index,
            })?;
        let table = structure::apply_content_prediction(table, cells)?;
        let enter = pending.enter_ocr_view && !table.needs_ocr();
        self.commit(pending.table_index, table);
        if enter {
            self.ocr_view = true;
            log::info!("Entered OCR view");
        }
        Ok(())
    }

    /// Enter or leave the OCR view.
    ///
    /// Entering needs OCR text in every cell of the selected table; when some
    /// is missing, content prediction is started instead and the view is
    /// entered once it succeeds.
    pub fn set_ocr_view(&mut self, on: bool) -> Result<Option<Request>, EditError> {
        if !on {
            if self.ocr_view {
                self.ocr_view = false;
                log::info!("Left OCR view");
            }
            return Ok(None);
        }
        if self.ocr_view {
            return Ok(None);
        }
        let index = self.selected_index()?;
        if self.tables[index].needs_ocr() {
            return self.start_content_prediction(true).map(Some);
        }
        self.ocr_view = true;
        log::info!("Entered OCR view");
        Ok(None)
    }

    pub fn update_cell_text(&mut self, cell: CellIndex, text: String) -> Result<(), EditError> {
        let index = self.selected_index()?;
        let table = structure::update_cell_text(&self.tables[index], cell, text)?;
        self.commit(index, table);
        Ok(())
    }

    /// Blank every corrected text of the selected table. OCR view only.
    pub fn clear_cell_texts(&mut self) -> Result<(), EditError> {
        if !self.ocr_view {
            return Err(EditError::PreconditionNotMet("only available in the OCR view"));
        }
        let index = self.selected_index()?;
        let table = structure::clear_cell_texts(&self.tables[index]);
        self.commit(index, table);
        Ok(())
    }

    pub fn set_column_types(
        &mut self,
        column: usize,
        types: Vec<ColumnType>,
    ) -> Result<(), EditError> {
        let index = self.selected_index()?;
        let table = structure::set_column_types(&self.tables[index], column, types)?;
        self.commit(index, table);
        Ok(())
    }

    pub fn add_virtual_value(&mut self) -> Result<(), EditError> {
        let index = self.selected_index()?;
        let table = structure::add_virtual_value(&self.tables[index]);
        self.commit(index, table);
        Ok(())
    }

    pub fn set_virtual_value_label(
        &mut self,
        value_index: usize,
        label: Option<ColumnType>,
    ) -> Result<(), EditError> {
        let index = self.selected_index()?;
        let table = structure::set_virtual_value_label(&self.tables[index], value_index, label)?;
        self.commit(index, table);
        Ok(())
    }

    pub fn set_virtual_value(&mut self, value_index: usize, value: String) -> Result<(), EditError> {
        let index = self.selected_index()?;
        let table = structure::set_virtual_value(&self.tables[index], value_index, value)?;
        self.commit(index, table);
        Ok(())
    }

    pub fn remove_virtual_value(&mut self, value_index: usize) -> Result<(), EditError> {
        let index = self.selected_index()?;
        let table = structure::remove_virtual_value(&self.tables[index], value_index)?;
        self.commit(index, table);
        Ok(())
    }

    // === Persistence feedback ===

    /// A save of the tables went through; flash the saved indicator.
    pub fn notify_saved(&mut self, now: Instant) -> bool {
        self.saved_indicator.trigger(now)
    }

    // === Helpers ===

    fn selected_index(&self) -> Result<usize, EditError> {
        let index = self.selection.table().ok_or(EditError::NoTableSelected)?;
        if index >= self.tables.len() {
            return Err(EditError::InvalidIndex {
                what: "table",
                index,
            });
        }
        Ok(index)
    }

    /// The selected table, if its structure may be edited right now.
    fn editable_table(&self) -> Result<(usize, &Table), EditError> {
        if self.ocr_view {
            return Err(EditError::OcrViewActive);
        }
        let index = self.selected_index()?;
        Ok((index, self.structure_editable(index)?))
    }

    /// Table `index`, if its structure may be edited right now.
    fn structure_editable(&self, index: usize) -> Result<&Table, EditError> {
        if self.ocr_view {
            return Err(EditError::OcrViewActive);
        }
        let table = self.tables.get(index).ok_or(EditError::InvalidIndex {
            what: "table",
            index,
        })?;
        if table.structure_locked {
            return Err(EditError::StructureLocked);
        }
        Ok(table)
    }

    fn current_image_name(&self) -> Result<String, EditError> {
        self.current_image()
            .map(|image| image.name.clone())
            .ok_or(EditError::PreconditionNotMet("no image loaded"))
    }

    /// Map a page position of the selected table into its local frame.
    fn selected_table_point(&self, page_point: Point) -> Result<Point, EditError> {
        let index = self.selected_index()?;
        self.table_point(&self.tables[index], page_point)
    }

    /// Map a page position into `table`'s local frame.
    ///
    /// The page is shown rotated by the view rotation, the table was drawn
    /// under its own rotation; the point is rotated by the difference around
    /// the page center before the document and outline offsets are removed.
    fn table_point(&self, table: &Table, page_point: Point) -> Result<Point, EditError> {
        let document = self
            .document_position
            .ok_or(EditError::PreconditionNotMet("document position unknown"))?;
        let image = self
            .current_image()
            .ok_or(EditError::PreconditionNotMet("no image loaded"))?;
        let rotated = rotate(
            page_point,
            table.rotation_degrees - self.rotation_degrees,
            image.center + document,
        );
        Ok(rotated - document - table.outline.top_left)
    }

    fn commit(&mut self, index: usize, table: Table) {
        if let Some(slot) = self.tables.get_mut(index) {
            *slot = table;
            self.tables_revision += 1;
            self.selection.reset_deletion_marks();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_state() -> AnnotatorState {
        let mut state = AnnotatorState::default();
        let images = vec![
            Image::new("p1.png", "p1.png", 400, 300),
            Image::new("p2.png", "p2.png", 400, 300),
        ];
        let request = state
            .load_images(images, None)
            .expect("load")
            .expect("request");
        let Request::FetchTables { id, .. } = request else {
            panic!("expected a table fetch");
        };
        state
            .complete_fetch_tables(id, Ok::<_, String>(Vec::new()))
            .expect("fetch");
        state.set_document_position(Point::new(0.0, 0.0));
        state
    }

    fn with_table() -> AnnotatorState {
        let mut state = loaded_state();
        state.outline_table(Point::new(10.0, 10.0)).expect("first");
        state.outline_table(Point::new(110.0, 60.0)).expect("second");
        state
    }

    #[test]
    fn test_outline_creates_and_selects_table() {
        let state = with_table();
        assert_eq!(state.tables().len(), 1);
        assert_eq!(state.selection().table(), Some(0));
        assert!(state.unfinished_table().is_none());
        assert_eq!(state.tables_revision(), 1);
    }

    #[test]
    fn test_outline_captures_view_rotation() {
        let mut state = loaded_state();
        state.rotate_view(1.5);
        state.outline_table(Point::new(10.0, 10.0)).expect("first");
        state.outline_table(Point::new(60.0, 60.0)).expect("second");
        assert_eq!(state.tables()[0].rotation_degrees, 1.5);
    }

    #[test]
    fn test_degenerate_outline_keeps_first_point() {
        let mut state = loaded_state();
        state.outline_table(Point::new(10.0, 10.0)).expect("first");
        assert!(state.outline_table(Point::new(15.0, 80.0)).is_err());
        assert!(state.tables().is_empty());
        assert!(state.unfinished_table().is_some());
    }

    #[test]
    fn test_cancel_clears_outline_and_marks() {
        let mut state = with_table();
        state.delete_table().expect("mark");
        state.outline_table(Point::new(200.0, 200.0)).expect("first");
        state.cancel_actions();
        state.cancel_actions();
        assert!(state.unfinished_table().is_none());
        assert_eq!(state.selection().deletion_marks(), 0);
        assert_eq!(state.selection().table(), Some(0));
    }

    #[test]
    fn test_select_invalid_table() {
        let mut state = with_table();
        assert!(state.select_table(Some(3)).is_err());
        assert_eq!(state.selection().table(), Some(0));
    }

    #[test]
    fn test_preview_column_maps_into_table_frame() {
        let mut state = with_table();
        state.set_document_position(Point::new(5.0, 5.0));
        state
            .preview_column(Some(Point::new(72.0, 30.0)))
            .expect("preview");
        // 72 - 5 (document) - 10 (outline) - 7 (knob)
        assert_eq!(state.new_column_position(), Some(50.0));
        state.add_column(None).expect("add");
        assert_eq!(state.tables()[0].columns, vec![50.0]);
    }

    #[test]
    fn test_preview_under_rotation_matches_unrotated_table() {
        let mut state = with_table();
        state.rotate_view(90.0);
        // A point shown 90 degrees rotated maps back onto the same local position.
        let center = state.current_image().expect("image").center;
        let shown = rotate(Point::new(67.0, 30.0), 90.0, center);
        state.preview_column(Some(shown)).expect("preview");
        assert_eq!(state.new_column_position(), Some(50.0));
    }

    #[test]
    fn test_selecting_table_clears_previews() {
        let mut state = with_table();
        state.preview_row(Some(Point::new(30.0, 47.0))).expect("preview");
        assert_eq!(state.new_row_position(), Some(30.0));
        state.select_table(Some(0)).expect("select");
        assert_eq!(state.new_row_position(), None);
    }

    #[test]
    fn test_locked_table_rejects_structure_edits() {
        let mut state = with_table();
        state.lock_table(true).expect("lock");
        let before = state.tables().to_vec();
        assert_eq!(state.add_column(Some(50.0)), Err(EditError::StructureLocked));
        assert_eq!(state.delete_table(), Err(EditError::StructureLocked));
        assert_eq!(state.tables(), &before[..]);
        state
            .update_cell_text(CellIndex::new(0, 0), "still editable".into())
            .expect("text");
    }

    #[test]
    fn test_delete_selected_dispatch() {
        let mut state = with_table();
        state.add_column(Some(50.0)).expect("add");
        state.select(SelectionTarget::Column(0)).expect("select");
        state.delete_selected().expect("delete column");
        assert!(state.tables()[0].columns.is_empty());

        state
            .select(SelectionTarget::Border(Border::Top))
            .expect("select");
        assert!(state.delete_selected().is_err());
        assert_eq!(state.tables().len(), 1);
    }

    #[test]
    fn test_drag_moves_column_after_delay() {
        let mut state = with_table();
        state.add_column(Some(50.0)).expect("add");
        let start = Instant::now();
        state
            .begin_drag(SelectionTarget::Column(0), start)
            .expect("drag");

        // 10 (outline) + 60 (target) + 7 (knob)
        let pointer = Point::new(77.0, 30.0);
        state
            .pointer_moved(pointer, start + Duration::from_millis(50))
            .expect("early move");
        assert_eq!(state.tables()[0].columns, vec![50.0]);

        state
            .pointer_moved(pointer, start + Duration::from_millis(150))
            .expect("move");
        assert_eq!(state.tables()[0].columns, vec![60.0]);

        state.end_drag();
        assert!(!state.is_dragging());
    }

    #[test]
    fn test_drag_right_border() {
        let mut state = with_table();
        let start = Instant::now();
        state
            .begin_drag(SelectionTarget::Border(Border::Right), start)
            .expect("drag");
        state
            .pointer_moved(Point::new(127.0, 30.0), start + Duration::from_secs(1))
            .expect("move");
        assert_eq!(state.tables()[0].outline.bottom_right.x, 120.0);
    }

    #[test]
    fn test_ocr_view_requires_text() {
        let mut state = with_table();
        let request = state.set_ocr_view(true).expect("start").expect("request");
        assert!(!state.ocr_view());
        assert!(state.is_running_ocr());
        let Request::PredictContents { id, .. } = request else {
            panic!("expected content prediction");
        };

        let cells = vec![vec![Cell {
            ocr_text: Some("Name".to_string()),
            ..Default::default()
        }]];
        state
            .complete_content_prediction(id, Ok::<_, String>(cells))
            .expect("complete");
        assert!(state.ocr_view());
        assert!(!state.is_running_ocr());
        assert!(state.tables()[0].structure_locked);
    }

    #[test]
    fn test_failed_prediction_clears_flag_only() {
        let mut state = with_table();
        let Request::PredictContents { id, .. } = state.predict_table_content().expect("start")
        else {
            panic!("expected content prediction");
        };
        let before = state.tables().to_vec();
        state
            .complete_content_prediction::<String>(id, Err("HTTP 500".into()))
            .expect("complete");
        assert!(!state.is_running_ocr());
        assert_eq!(state.tables(), &before[..]);
    }

    #[test]
    fn test_navigation_blocked_while_predicting() {
        let mut state = with_table();
        state.segment_table().expect("segment");
        assert_eq!(state.next_image(), Err(EditError::OperationInProgress));
    }

    #[test]
    fn test_structure_prediction_uses_row_insertion() {
        let mut state = with_table();
        let Request::PredictStructure { id, .. } = state.segment_table().expect("segment") else {
            panic!("expected structure prediction");
        };
        state
            .complete_structure_prediction(id, Ok::<_, String>(vec![20.0, 25.0, 35.0]))
            .expect("complete");
        // 25 is too close to 20 and gets skipped
        assert_eq!(state.tables()[0].rows, vec![20.0, 35.0]);
        assert!(!state.is_running_segmentation());
    }

    #[test]
    fn test_stale_response_is_rejected() {
        let mut state = loaded_state();
        let Request::FetchTables { id: first, .. } = state.select_image(1).expect("first") else {
            panic!("expected a table fetch");
        };
        let Request::FetchTables { id: second, .. } = state.select_image(0).expect("second")
        else {
            panic!("expected a table fetch");
        };
        assert_eq!(
            state.complete_fetch_tables(first, Ok::<_, String>(Vec::new())),
            Err(EditError::StaleRequest { id: first })
        );
        state
            .complete_fetch_tables(second, Ok::<_, String>(Vec::new()))
            .expect("current");
        assert_eq!(state.current_image_index(), 0);
    }

    #[test]
    fn test_navigation_resets_view() {
        let mut state = with_table();
        state.rotate_view(2.0);
        let Request::FetchTables { id, .. } = state.next_image().expect("next") else {
            panic!("expected a table fetch");
        };
        state
            .complete_fetch_tables(id, Ok::<_, String>(Vec::new()))
            .expect("fetch");
        assert_eq!(state.current_image_index(), 1);
        assert_eq!(state.rotation_degrees(), 0.0);
        assert!(state.document_position().is_none());
        assert!(state.selection().table().is_none());
        assert!(state.tables().is_empty());
    }

    #[test]
    fn test_document_state_request() {
        let mut state = loaded_state();
        let request = state
            .set_document_state(DocumentState::Done)
            .expect("state");
        assert_eq!(
            request,
            Request::SaveDocumentState {
                image_name: "p1.png".to_string(),
                state: DocumentState::Done
            }
        );
        assert!(state.current_image().expect("image").finished);
    }

    #[test]
    fn test_saved_indicator() {
        let mut state = AnnotatorState::default();
        let now = Instant::now();
        assert!(state.notify_saved(now));
        assert!(state.is_saved_indicator_visible(now + Duration::from_secs(1)));
        assert!(!state.is_saved_indicator_visible(now + Duration::from_secs(2)));
    }
}
