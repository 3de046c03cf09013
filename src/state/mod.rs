//! Interactive annotator state.
//!
//! [`AnnotatorState`] owns everything the user edits; the submodules hold the
//! smaller pieces of transient UI state it is built from.

mod annotator;
mod drag;
mod requests;
mod saved_indicator;
mod selection;

#[cfg(test)]
mod tests;

pub use annotator::{AnnotatorState, EngineSettings};
pub use drag::DragState;
pub use requests::{Request, RequestId};
pub use saved_indicator::SavedIndicator;
pub use selection::{Selection, SelectionTarget};
