//! Tickets for collaborator calls started by the annotator.
//!
//! The annotator never talks to a collaborator itself. Operations that need
//! one hand back a [`Request`]; the caller performs it and reports the
//! outcome with the request's id. Outcomes for ids that are no longer
//! pending are dropped.

use serde::{Deserialize, Serialize};

use crate::model::DocumentState;

/// Identifier of an issued request.
pub type RequestId = u64;

/// A collaborator call the caller has to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    /// Load the tables of an image before switching to it
    FetchTables {
        id: RequestId,
        image_index: usize,
        image_name: String,
    },
    /// Predict the row lines of an empty table
    PredictStructure {
        id: RequestId,
        image_name: String,
        table_index: usize,
    },
    /// Run OCR on every cell of a table
    PredictContents {
        id: RequestId,
        image_name: String,
        table_index: usize,
    },
    /// Store the annotation progress of an image
    SaveDocumentState {
        image_name: String,
        state: DocumentState,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PendingFetch {
    pub id: RequestId,
    pub image_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PendingPrediction {
    pub id: RequestId,
    pub table_index: usize,
    /// Enter the OCR view once the prediction has been applied.
    pub enter_ocr_view: bool,
}

/// In-flight requests. At most one of each kind is pending.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RequestTracker {
    next_id: RequestId,
    pub fetch: Option<PendingFetch>,
    pub segmentation: Option<PendingPrediction>,
    pub ocr: Option<PendingPrediction>,
}

impl RequestTracker {
    pub fn next_id(&mut self) -> RequestId {
        self.next_id += 1;
        self.next_id
    }

    pub fn is_predicting(&self) -> bool {
        self.segmentation.is_some() || self.ocr.is_some()
    }

    /// Remove and return the pending request matching `id`.
    pub fn take_matching<T: Copy>(
        slot: &mut Option<T>,
        id: RequestId,
        id_of: impl Fn(&T) -> RequestId,
    ) -> Option<T> {
        match slot {
            Some(pending) if id_of(pending) == id => slot.take(),
            _ => None,
        }
    }
}
