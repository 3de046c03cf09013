//! Scanned document images.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Annotation progress of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentState {
    /// Still to be processed
    #[default]
    Todo,
    /// A document about a single person, not a list
    SinglePersonDoc,
    /// A handwritten list
    HandwrittenList,
    /// Nothing to extract
    NoData,
    /// Fully annotated
    Done,
}

impl DocumentState {
    /// Get the display name for this state.
    pub fn name(&self) -> &'static str {
        match self {
            DocumentState::Todo => "To do",
            DocumentState::SinglePersonDoc => "Single person document",
            DocumentState::HandwrittenList => "Handwritten list",
            DocumentState::NoData => "No data",
            DocumentState::Done => "Done",
        }
    }
}

/// Display-only adjustments requested for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryImageParameters {
    pub inverted: bool,
    /// Number of quarter turns applied before display.
    pub rotation_steps: u8,
}

/// A scanned page that tables are annotated on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub src: String,
    pub width: u32,
    pub height: u32,
    /// Rotation center of the page, `(width / 2, height / 2)`.
    pub center: Point,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub document_state: DocumentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_parameters: Option<TemporaryImageParameters>,
}

impl Image {
    pub fn new(name: impl Into<String>, src: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            src: src.into(),
            width,
            height,
            center: Point::new(width as f32 / 2.0, height as f32 / 2.0),
            name: name.into(),
            doc_id: None,
            finished: false,
            document_state: DocumentState::default(),
            temporary_parameters: None,
        }
    }

    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    /// Whether a point in image-local space lies on the page.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x <= self.width as f32
            && point.y <= self.height as f32
    }
}
