//! Persistence boundary.
//!
//! The layout engine reads a section through [`SectionStore::fetch_section`]
//! and writes positions back one call at a time. Each method is a single
//! request; callers await it before issuing the next one.

#[cfg(target_arch = "wasm32")]
mod js;
mod memory;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{LayoutConfiguration, Placement, SectionSnapshot, TextCell};

#[cfg(target_arch = "wasm32")]
pub use js::JsStore;
pub use memory::{MemoryStore, StoreCall};

/// Body of a parameter position update. The parameter endpoint accepts
/// position fields only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub grid_row: u32,
    pub grid_column: u32,
    pub grid_span: u32,
}

impl From<Placement> for PositionUpdate {
    fn from(p: Placement) -> Self {
        Self {
            grid_row: p.row,
            grid_column: p.column,
            grid_span: p.span,
        }
    }
}

impl PositionUpdate {
    pub fn placement(&self) -> Placement {
        Placement::new(self.grid_row, self.grid_column, self.grid_span)
    }
}

/// Body of a text cell update. The text endpoint is not position-only, so
/// content and style travel with every move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCellUpdate {
    pub grid_row: u32,
    pub grid_column: u32,
    pub grid_span: u32,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
}

impl TextCellUpdate {
    /// Update that moves `cell` to `placement`, keeping its payload.
    pub fn moved(cell: &TextCell, placement: Placement) -> Self {
        Self {
            grid_row: placement.row,
            grid_column: placement.column,
            grid_span: placement.span,
            content: cell.content.clone(),
            style: cell.style.clone(),
        }
    }

    pub fn placement(&self) -> Placement {
        Placement::new(self.grid_row, self.grid_column, self.grid_span)
    }
}

/// Remote storage for sections and their cells.
///
/// Implementations report any transport, authorization or validation
/// failure as [`FormGridError::Store`](crate::error::FormGridError::Store).
/// Cell writes address a cell by its id alone; ids are unique per table
/// across all sections.
#[allow(async_fn_in_trait)]
pub trait SectionStore {
    /// Fetch the authoritative state of a section.
    async fn fetch_section(&mut self, section_id: u64) -> Result<SectionSnapshot>;

    /// Replace a section's layout configuration.
    async fn update_layout(&mut self, section_id: u64, config: &LayoutConfiguration) -> Result<()>;

    /// Set a parameter cell's row, column and span.
    async fn move_parameter(&mut self, id: u64, position: PositionUpdate) -> Result<()>;

    /// Update a text cell's position and payload.
    async fn update_text_cell(&mut self, id: u64, update: &TextCellUpdate) -> Result<()>;

    async fn delete_parameter(&mut self, id: u64) -> Result<()>;

    async fn delete_text_cell(&mut self, id: u64) -> Result<()>;
}
