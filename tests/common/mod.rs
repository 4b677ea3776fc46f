//! Common test utilities and assertion helpers.
//!
//! Wraps the in-memory store in an editor, drives its futures to
//! completion and checks grid invariants.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::future::Future;

use formgrid::store::{MemoryStore, StoreCall};
use formgrid::types::{CellId, Placement, SectionSnapshot};
use formgrid::{Grid, GridConfig, SectionEditor};

// Re-export fixtures for convenience
pub use super::fixtures::*;

/// Run a future to completion on the current thread.
pub fn run<F: Future>(future: F) -> F::Output {
    futures_lite::future::block_on(future)
}

/// Admin editor over a store holding only `snapshot`.
pub fn editor(snapshot: SectionSnapshot) -> SectionEditor<MemoryStore> {
    editor_with(snapshot, GridConfig::default())
}

pub fn editor_with(snapshot: SectionSnapshot, config: GridConfig) -> SectionEditor<MemoryStore> {
    let id = snapshot.section.id;
    SectionEditor::new(MemoryStore::with_section(snapshot), id, config)
}

/// Stored section as the store holds it now.
pub fn stored(editor: &SectionEditor<MemoryStore>) -> SectionSnapshot {
    editor
        .store()
        .section(editor.section_id())
        .cloned()
        .expect("section exists in store")
}

/// Position of a cell in the stored section, if it still exists.
pub fn stored_placement(editor: &SectionEditor<MemoryStore>, id: CellId) -> Option<Placement> {
    stored(editor)
        .cells()
        .into_iter()
        .find(|cell| cell.id() == id)
        .map(|cell| cell.placement())
}

/// Write calls issued so far.
pub fn writes(editor: &SectionEditor<MemoryStore>) -> Vec<StoreCall> {
    editor.store().writes().into_iter().cloned().collect()
}

pub fn fetches(editor: &SectionEditor<MemoryStore>) -> usize {
    editor
        .store()
        .calls()
        .iter()
        .filter(|call| matches!(call, StoreCall::FetchSection(_)))
        .count()
}

/// Ids anchored in `row`, in column order.
pub fn row_ids(grid: &Grid, row: u32) -> Vec<CellId> {
    grid.row(row)
        .map(|r| r.cells().map(|cell| cell.id()).collect())
        .unwrap_or_default()
}

/// Every anchor owns the slots its span covers inside the row, up to the
/// first column taken by a later anchor, and every tombstone points back at
/// an anchor covering it. No two rendered intervals overlap.
pub fn assert_span_containment(grid: &Grid) {
    use formgrid::layout::Slot;

    for row in &grid.rows {
        assert_eq!(row.slots.len(), row.columns as usize, "row {} width", row.row);
        for (idx, slot) in row.slots.iter().enumerate() {
            let column = idx as u32 + 1;
            match slot {
                Slot::Cell { cell } => {
                    let placement = cell.placement();
                    assert_eq!(placement.row, row.row, "{} anchored in the wrong row", cell.id());
                    assert_eq!(placement.column, column, "{} anchored in the wrong column", cell.id());
                    let end = placement.end_column().min(row.columns);
                    let extent = row.extent(column);
                    assert!(extent <= end, "{} covers past its span", cell.id());
                    if extent < end {
                        assert!(
                            matches!(row.slot(extent + 1), Some(Slot::Cell { .. })),
                            "{} span cut short without a later anchor in row {}",
                            cell.id(),
                            row.row
                        );
                    }
                    for other in extent + 1..=row.columns {
                        assert_ne!(
                            row.slot(other),
                            Some(&Slot::Spanned { anchor: column }),
                            "{} has a detached tombstone at column {other} of row {}",
                            cell.id(),
                            row.row
                        );
                    }
                }
                Slot::Spanned { anchor } => {
                    assert!(*anchor < column, "tombstone before its anchor in row {}", row.row);
                    let owner = grid
                        .cell_at(row.row, *anchor)
                        .unwrap_or_else(|| panic!("dangling tombstone at ({}, {column})", row.row));
                    assert!(owner.placement().end_column() >= column);
                }
                Slot::Empty => {}
            }
        }
    }
}

/// Every placed cell ends inside its row's declared width.
pub fn assert_cells_fit(grid: &Grid) {
    for cell in &grid.cells {
        let placement = cell.placement();
        assert!(
            placement.end_column() <= grid.columns_of(placement.row),
            "{} ends at column {} but row {} has {} columns",
            cell.id(),
            placement.end_column(),
            placement.row,
            grid.columns_of(placement.row)
        );
    }
}
