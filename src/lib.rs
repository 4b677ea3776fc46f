//! formgrid - sparse grid layout engine for sectioned admin forms
//!
//! Sections hold parameter cells and text cells placed by row, column and
//! span. This crate:
//! - Rebuilds the dense grid from the sparse cell set, tolerating stale data
//! - Inserts and deletes whole rows, renumbering every affected cell once
//! - Drives drag-and-drop repositioning of single cells
//!
//! Persistence goes through the [`store::SectionStore`] trait. Every write
//! is awaited before the next one is issued, and the section is refetched
//! after every mutation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use formgrid::{GridConfig, MemoryStore, SectionEditor};
//!
//! let mut editor = SectionEditor::new(MemoryStore::with_section(snapshot), 1, GridConfig::default());
//! editor.insert_row_after(2).await?;
//! let grid = editor.grid().await?;
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod layout;
pub mod store;
pub mod types;

#[cfg(target_arch = "wasm32")]
mod wasm;

use wasm_bindgen::prelude::*;

pub use config::{ConflictPolicy, GridConfig, MAX_COLUMNS, NEW_ROW_COLUMNS};
pub use editor::SectionEditor;
pub use error::{FormGridError, Result};
pub use layout::{build_grid, Grid};
pub use store::{MemoryStore, SectionStore};
pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
