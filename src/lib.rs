//! labelkit - annotation editing core
//!
//! Drawing, validation, undo/redo and persistence orchestration for image
//! annotation tools. Rendering and transport live outside this crate: the UI
//! layer feeds pointer and key input into a [`Session`], and storage is reached
//! through the [`AnnotationStore`] trait.

pub mod config;
pub mod drawing;
pub mod error;
pub mod history;
pub mod keybindings;
pub mod model;
pub mod replay;
pub mod session;
pub mod store;
pub mod tool;

pub use config::EditorConfig;
pub use drawing::DrawingState;
pub use error::{EditorError, Operation};
pub use history::{HistoryAction, HistoryLedger};
pub use keybindings::{InputCommand, KeyBindings};
pub use session::Session;
pub use store::{AnnotationStore, MemoryStore, StoreError};
pub use tool::{ProjectType, Tool};
