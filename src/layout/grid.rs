//! Dense grid reconstruction from a sparse cell set.
//!
//! The grid is never persisted. It is rebuilt from the section's layout
//! configuration and its cells every time it is read, so it always reflects
//! the last fetched state.

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::MAX_COLUMNS;
use crate::types::{Cell, CellId, LayoutConfiguration, PresentationMode, SectionSnapshot};

/// Contents of one `(row, column)` position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Slot {
    Empty,
    /// Anchor slot of a cell.
    Cell { cell: Cell },
    /// Covered by the span of the cell anchored at `anchor` in the same row.
    Spanned { anchor: u32 },
}

impl Slot {
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// One row of the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    /// 1-based row number
    pub row: u32,
    pub columns: u32,
    /// `slots[i]` is column `i + 1`
    pub slots: Vec<Slot>,
}

impl GridRow {
    fn new(row: u32, columns: u32) -> Self {
        Self {
            row,
            columns,
            slots: vec![Slot::Empty; columns as usize],
        }
    }

    pub fn slot(&self, column: u32) -> Option<&Slot> {
        let idx = column.checked_sub(1)? as usize;
        self.slots.get(idx)
    }

    fn slot_mut(&mut self, column: u32) -> Option<&mut Slot> {
        let idx = column.checked_sub(1)? as usize;
        self.slots.get_mut(idx)
    }

    /// Anchored cells in column order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Cell { cell } => Some(cell),
            _ => None,
        })
    }

    /// Last column covered by the cell anchored at `anchor`, following its
    /// tombstones. Equals `anchor` for a single-column cell.
    pub fn extent(&self, anchor: u32) -> u32 {
        let mut last = anchor;
        while self.slot(last.saturating_add(1)) == Some(&Slot::Spanned { anchor }) {
            last = last.saturating_add(1);
        }
        last
    }

    /// Remove the cell anchored at `anchor` along with its span tombstones.
    fn clear_anchor(&mut self, anchor: u32) -> Option<Cell> {
        let removed = match self.slot_mut(anchor) {
            Some(slot) if matches!(slot, Slot::Cell { .. }) => match std::mem::replace(slot, Slot::Empty) {
                Slot::Cell { cell } => Some(cell),
                _ => None,
            },
            _ => None,
        };
        self.truncate_span(anchor, anchor);
        removed
    }

    /// Drop the tombstones of `anchor` from column `from` onwards.
    fn truncate_span(&mut self, anchor: u32, from: u32) {
        let start = from.saturating_sub(1) as usize;
        for slot in self.slots.iter_mut().skip(start) {
            if *slot == (Slot::Spanned { anchor }) {
                *slot = Slot::Empty;
            }
        }
    }
}

/// Dense, derived placement of a section's cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub mode: PresentationMode,
    pub row_count: u32,
    pub rows: Vec<GridRow>,
    /// Every placed cell in row-major order.
    pub cells: Vec<Cell>,
    /// Cells outside the grid bounds, left out of the rendering.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orphans: Vec<Cell>,
    /// Cells whose anchor slot was taken by a later cell.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overwritten: Vec<Cell>,
}

/// Column count of `row`: the configured value if present, otherwise the
/// widest extent of the cells in that row, within `1..=MAX_COLUMNS`.
pub fn columns_of(config: &LayoutConfiguration, cells: &[Cell], row: u32) -> u32 {
    if let Some(columns) = config.columns(row) {
        return columns.clamp(1, MAX_COLUMNS);
    }
    cells
        .iter()
        .filter(|cell| cell.row() == row)
        .map(|cell| cell.placement().end_column())
        .max()
        .map_or(1, |extent| extent.clamp(1, MAX_COLUMNS))
}

/// Number of rows the grid spans.
///
/// A configured section has exactly its highest configured row; cells
/// below it are stale. A section with no configured rows spans down to
/// its lowest cell.
pub fn row_count(config: &LayoutConfiguration, cells: &[Cell]) -> u32 {
    if config.rows_columns().is_empty() {
        cells.iter().map(Cell::row).max().unwrap_or(0)
    } else {
        config.max_row()
    }
}

/// Build the grid for a fetched section.
pub fn build_grid(snapshot: &SectionSnapshot, mode: PresentationMode) -> Grid {
    build_grid_from_cells(&snapshot.section.config, &snapshot.cells(), mode)
}

/// Build the grid from already classified cells.
///
/// Cells are placed in order, so a later cell replaces an earlier one at the
/// same coordinate. Callers pass parameter cells before text cells.
/// Never fails: out-of-bounds cells end up in [`Grid::orphans`].
pub fn build_grid_from_cells(
    config: &LayoutConfiguration,
    cells: &[Cell],
    mode: PresentationMode,
) -> Grid {
    let row_count = row_count(config, cells);
    let mut rows: Vec<GridRow> = (1..=row_count)
        .map(|row| GridRow::new(row, columns_of(config, cells, row)))
        .collect();

    let mut orphans = Vec::new();
    let mut overwritten = Vec::new();

    for cell in cells {
        let placement = cell.placement();
        let Some(grid_row) = placement
            .row
            .checked_sub(1)
            .and_then(|idx| rows.get_mut(idx as usize))
        else {
            debug!(cell = %cell.id(), row = placement.row, "cell outside grid rows");
            orphans.push(cell.clone());
            continue;
        };
        if placement.column == 0 || placement.column > grid_row.columns {
            debug!(
                cell = %cell.id(),
                row = placement.row,
                column = placement.column,
                columns = grid_row.columns,
                "cell outside row columns"
            );
            orphans.push(cell.clone());
            continue;
        }

        let last = placement.end_column().min(grid_row.columns);
        for column in placement.column..=last {
            let displaced = match grid_row.slot(column) {
                Some(Slot::Cell { .. }) => grid_row.clear_anchor(column),
                Some(Slot::Spanned { anchor }) => {
                    // Only the tail of the earlier span is lost; its anchor stays.
                    let anchor = *anchor;
                    debug!(kept = %cell.id(), row = placement.row, anchor, column, "span cut short");
                    grid_row.truncate_span(anchor, column);
                    None
                }
                _ => None,
            };
            if let Some(previous) = displaced {
                warn!(
                    kept = %cell.id(),
                    dropped = %previous.id(),
                    row = placement.row,
                    column,
                    "cells share a coordinate, last one wins"
                );
                overwritten.push(previous);
            }
        }

        if let Some(slot) = grid_row.slot_mut(placement.column) {
            *slot = Slot::Cell { cell: cell.clone() };
        }
        for column in placement.column.saturating_add(1)..=last {
            if let Some(slot) = grid_row.slot_mut(column) {
                *slot = Slot::Spanned {
                    anchor: placement.column,
                };
            }
        }
    }

    let placed: Vec<Cell> = rows.iter().flat_map(GridRow::cells).cloned().collect();

    trace!(
        row_count,
        placed = placed.len(),
        orphans = orphans.len(),
        overwritten = overwritten.len(),
        "built grid"
    );

    Grid {
        mode,
        row_count,
        rows,
        cells: placed,
        orphans,
        overwritten,
    }
}

impl Grid {
    pub fn row(&self, row: u32) -> Option<&GridRow> {
        self.rows.get(row.checked_sub(1)? as usize)
    }

    /// Column count of `row`, 0 for rows outside the grid.
    pub fn columns_of(&self, row: u32) -> u32 {
        self.row(row).map_or(0, |r| r.columns)
    }

    pub fn slot(&self, row: u32, column: u32) -> Option<&Slot> {
        self.row(row)?.slot(column)
    }

    /// Cell anchored exactly at `(row, column)`.
    pub fn cell_at(&self, row: u32, column: u32) -> Option<&Cell> {
        match self.slot(row, column)? {
            Slot::Cell { cell } => Some(cell),
            _ => None,
        }
    }

    /// Cell covering `(row, column)`, following span tombstones.
    pub fn owner_at(&self, row: u32, column: u32) -> Option<&Cell> {
        match self.slot(row, column)? {
            Slot::Cell { cell } => Some(cell),
            Slot::Spanned { anchor } => self.cell_at(row, *anchor),
            Slot::Empty => None,
        }
    }

    /// A placed cell by id.
    pub fn find(&self, id: CellId) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id() == id)
    }

    /// Every stored cell whose position is inside the grid, including ones
    /// hidden by a later cell at the same coordinate.
    pub fn stored_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().chain(&self.overwritten)
    }

    /// True when the section has no rows and the caller should offer to
    /// start from a template. Never shown to read-only consumers.
    pub fn needs_template(&self) -> bool {
        self.row_count == 0 && self.mode != PresentationMode::View
    }

    pub fn orphans(&self) -> &[Cell] {
        &self.orphans
    }

    pub fn overwritten(&self) -> &[Cell] {
        &self.overwritten
    }
}
