//! Table annotator
//!
//! Engine for annotating table structure on scanned documents: table
//! outlines, row and column lines, per-cell wall offsets, OCR text and
//! column semantics, with validation that keeps every grid well formed.
//!
//! [`state::AnnotatorState`] is the entry point. User actions are
//! [`message::Message`]s; calls to collaborators (stored tables, prediction
//! models) are handed out as [`state::Request`]s and can be served by a
//! [`persistence::Backend`].

pub mod config;
pub mod constants;
pub mod geometry;
pub mod hash;
pub mod keybindings;
pub mod message;
pub mod model;
pub mod persistence;
pub mod state;
pub mod structure;
