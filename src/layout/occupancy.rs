//! Placement checks against a built grid.
//!
//! Used before every position write so a row never declares fewer columns
//! than its cells need and (unless configured otherwise) no two cells in a
//! row overlap.

use crate::error::{FormGridError, Result};
use crate::types::{Cell, CellId, Placement};

use super::Grid;

/// Widest extent (`column + span - 1`) of any stored cell in `row`, 0 if
/// the row holds none.
pub fn required_columns(grid: &Grid, row: u32) -> u32 {
    grid.stored_cells()
        .filter(|cell| cell.row() == row)
        .map(|cell| cell.placement().end_column())
        .max()
        .unwrap_or(0)
}

/// Whether `placement` lies entirely inside the grid's current bounds.
pub fn fits(grid: &Grid, placement: &Placement) -> bool {
    placement.row >= 1
        && placement.column >= 1
        && placement.span >= 1
        && placement.end_column() <= grid.columns_of(placement.row)
}

/// First stored cell other than `moving` whose interval overlaps
/// `placement`.
pub fn overlapping<'a>(grid: &'a Grid, placement: &Placement, moving: Option<CellId>) -> Option<&'a Cell> {
    grid.stored_cells()
        .filter(|cell| Some(cell.id()) != moving)
        .find(|cell| cell.placement().overlaps(placement))
}

/// Validate a write of `placement` for `moving`: it must fit in the grid
/// and, when `reject_overlap` is set, must not overlap another cell.
pub fn check_placement(
    grid: &Grid,
    placement: &Placement,
    moving: Option<CellId>,
    reject_overlap: bool,
) -> Result<()> {
    if !fits(grid, placement) {
        return Err(FormGridError::OutOfBounds {
            row: placement.row,
            column: placement.column,
            span: placement.span,
        });
    }
    if reject_overlap {
        if let Some(other) = overlapping(grid, placement, moving) {
            return Err(FormGridError::Conflict {
                cell: other.id(),
                row: placement.row,
                column: placement.column,
            });
        }
    }
    Ok(())
}
