//! Loading and storing annotations.
//!
//! The [`Backend`] trait is the boundary to whatever holds images, tables and
//! prediction models; [`SaveScheduler`] turns table edits into debounced
//! saves.

mod auto_save;
mod backend;
mod error;
#[cfg(not(target_arch = "wasm32"))]
mod folder;

pub use auto_save::{SaveScheduler, SaveTicket};
pub use backend::{Backend, fulfil};
pub use error::PersistenceError;
#[cfg(not(target_arch = "wasm32"))]
pub use folder::{FolderBackend, IMAGE_EXTENSIONS};
