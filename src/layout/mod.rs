//! Grid model for section layouts.
//!
//! This module handles:
//! - Rebuilding a dense row/column grid from sparse cell positions
//! - Per-row column counts (configured or derived from cell extents)
//! - Span tombstones and stale-cell detection
//! - Placement checks used before position writes

mod grid;
pub mod occupancy;

pub use grid::{build_grid, build_grid_from_cells, columns_of, row_count, Grid, GridRow, Slot};
