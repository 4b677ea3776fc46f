//! Row insertion, deletion and resizing.
//!
//! Every operation is planned as an ordered list of persistence steps from a
//! fetched snapshot, then executed one awaited call at a time. Nothing is
//! rolled back: when a step fails, the steps before it stay applied and the
//! error says how many there were.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{MAX_COLUMNS, NEW_ROW_COLUMNS};
use crate::error::{FormGridError, Result};
use crate::layout::{build_grid, occupancy, Grid};
use crate::store::{PositionUpdate, SectionStore, TextCellUpdate};
use crate::types::{Cell, LayoutConfiguration, Placement, PresentationMode, SectionSnapshot};

/// A structural change to a section's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum RowOperation {
    InsertBefore { row: u32 },
    InsertAfter { row: u32 },
    Delete { row: u32 },
    SetColumns { row: u32, columns: u32 },
    /// Give an empty section its first row.
    InitializeFirstRow,
}

/// One persistence call of a planned operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistStep {
    UpdateLayout(LayoutConfiguration),
    MoveParameter { id: u64, position: PositionUpdate },
    UpdateTextCell { id: u64, update: TextCellUpdate },
    DeleteParameter(u64),
    DeleteTextCell(u64),
}

impl fmt::Display for PersistStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistStep::UpdateLayout(config) => {
                write!(f, "update layout")?;
                for (row, columns) in config.rows_columns() {
                    write!(f, " {row}:{columns}")?;
                }
                Ok(())
            }
            PersistStep::MoveParameter { id, position } => write!(
                f,
                "move param-{id} to row {} column {} span {}",
                position.grid_row, position.grid_column, position.grid_span
            ),
            PersistStep::UpdateTextCell { id, update } => write!(
                f,
                "move text-{id} to row {} column {} span {}",
                update.grid_row, update.grid_column, update.grid_span
            ),
            PersistStep::DeleteParameter(id) => write!(f, "delete param-{id}"),
            PersistStep::DeleteTextCell(id) => write!(f, "delete text-{id}"),
        }
    }
}

/// Ordered persistence calls for one [`RowOperation`].
#[derive(Debug, Clone, PartialEq)]
pub struct RowPlan {
    pub operation: RowOperation,
    pub steps: Vec<PersistStep>,
}

/// Row map after inserting a fresh row at `at`: rows from `at` down move
/// one further down and `at` gets the default width.
pub fn rows_after_insert(rows: &BTreeMap<u32, u32>, at: u32) -> BTreeMap<u32, u32> {
    let mut next: BTreeMap<u32, u32> = rows
        .iter()
        .map(|(&row, &columns)| {
            if row >= at {
                (row.saturating_add(1), columns)
            } else {
                (row, columns)
            }
        })
        .collect();
    next.insert(at, NEW_ROW_COLUMNS);
    next
}

/// Row map after deleting `target`: its entry is dropped and rows below it
/// move one up.
pub fn rows_after_delete(rows: &BTreeMap<u32, u32>, target: u32) -> BTreeMap<u32, u32> {
    rows.iter()
        .filter(|(&row, _)| row != target)
        .map(|(&row, &columns)| {
            if row > target {
                (row.saturating_sub(1), columns)
            } else {
                (row, columns)
            }
        })
        .collect()
}

fn move_step(cell: &Cell, placement: Placement) -> PersistStep {
    match cell {
        Cell::Parameter(p) => PersistStep::MoveParameter {
            id: p.id,
            position: placement.into(),
        },
        Cell::Text(t) => PersistStep::UpdateTextCell {
            id: t.id,
            update: TextCellUpdate::moved(t, placement),
        },
    }
}

fn delete_step(cell: &Cell) -> PersistStep {
    match cell {
        Cell::Parameter(p) => PersistStep::DeleteParameter(p.id),
        Cell::Text(t) => PersistStep::DeleteTextCell(t.id),
    }
}

/// Row moves for every selected cell, parameters before text cells.
///
/// Moving down goes bottom-up and moving up goes top-down, so a cell never
/// lands on a row whose cells have not moved away yet.
fn shift_steps<F>(cells: &[Cell], selects: F, down: bool) -> Vec<PersistStep>
where
    F: Fn(u32) -> bool,
{
    let mut moving: Vec<&Cell> = cells.iter().filter(|cell| selects(cell.row())).collect();
    moving.sort_by(|a, b| {
        let rows = if down {
            b.row().cmp(&a.row())
        } else {
            a.row().cmp(&b.row())
        };
        (!a.is_parameter()).cmp(&!b.is_parameter()).then(rows)
    });
    moving
        .into_iter()
        .map(|cell| {
            let placement = if down {
                cell.placement().shifted_down()
            } else {
                cell.placement().shifted_up()
            };
            move_step(cell, placement)
        })
        .collect()
}

/// Row map a layout write starts from. A section with no configured rows
/// gets the widths its cells currently give it, so the write does not
/// shrink the grid to the one row it touches.
fn current_rows(config: &LayoutConfiguration, grid: &Grid) -> BTreeMap<u32, u32> {
    if config.rows_columns().is_empty() {
        grid.rows.iter().map(|row| (row.row, row.columns)).collect()
    } else {
        config.rows_columns().clone()
    }
}

fn check_row(grid: &Grid, row: u32) -> Result<()> {
    if row == 0 || row > grid.row_count {
        return Err(FormGridError::RowOutOfRange {
            row,
            row_count: grid.row_count,
        });
    }
    Ok(())
}

/// Plan `operation` against the fetched state of a section.
pub fn plan_row_operation(snapshot: &SectionSnapshot, operation: RowOperation) -> Result<RowPlan> {
    let grid = build_grid(snapshot, PresentationMode::Admin);
    let config = &snapshot.section.config;
    let cells = snapshot.cells();
    let mut rows = current_rows(config, &grid);

    let steps = match operation {
        RowOperation::InsertBefore { row } | RowOperation::InsertAfter { row } => {
            check_row(&grid, row)?;
            let at = match operation {
                RowOperation::InsertAfter { .. } => row.saturating_add(1),
                _ => row,
            };
            let layout = config.with_rows_columns(rows_after_insert(&rows, at));
            let mut steps = vec![PersistStep::UpdateLayout(layout)];
            steps.extend(shift_steps(&cells, |r| r >= at, true));
            steps
        }
        RowOperation::Delete { row } => {
            check_row(&grid, row)?;
            let mut doomed: Vec<&Cell> = cells.iter().filter(|cell| cell.row() == row).collect();
            doomed.sort_by_key(|cell| !cell.is_parameter());
            let mut steps: Vec<PersistStep> = doomed.into_iter().map(delete_step).collect();
            steps.extend(shift_steps(&cells, |r| r > row, false));
            steps.push(PersistStep::UpdateLayout(
                config.with_rows_columns(rows_after_delete(&rows, row)),
            ));
            steps
        }
        RowOperation::SetColumns { row, columns } => {
            check_row(&grid, row)?;
            if !(1..=MAX_COLUMNS).contains(&columns) {
                return Err(FormGridError::InvalidColumnCount { row, columns });
            }
            let required = occupancy::required_columns(&grid, row);
            if columns < required {
                return Err(FormGridError::ColumnsTooNarrow {
                    row,
                    columns,
                    required,
                });
            }
            rows.insert(row, columns);
            vec![PersistStep::UpdateLayout(config.with_rows_columns(rows))]
        }
        RowOperation::InitializeFirstRow => {
            if grid.row_count > 0 {
                Vec::new()
            } else {
                rows.insert(1, NEW_ROW_COLUMNS);
                vec![PersistStep::UpdateLayout(config.with_rows_columns(rows))]
            }
        }
    };

    Ok(RowPlan { operation, steps })
}

/// Issue the steps of `plan` in order, awaiting each before the next.
///
/// Returns the number of steps applied. On failure the error is
/// [`FormGridError::Interrupted`] carrying how many steps completed.
pub async fn execute_plan<S: SectionStore>(
    store: &mut S,
    section_id: u64,
    plan: &RowPlan,
) -> Result<usize> {
    execute_steps(store, section_id, &plan.steps).await
}

pub(crate) async fn execute_steps<S: SectionStore>(
    store: &mut S,
    section_id: u64,
    steps: &[PersistStep],
) -> Result<usize> {
    let total = steps.len();
    for (applied, step) in steps.iter().enumerate() {
        debug!(section_id, step = %step, "persisting");
        let outcome = match step {
            PersistStep::UpdateLayout(config) => store.update_layout(section_id, config).await,
            PersistStep::MoveParameter { id, position } => store.move_parameter(*id, *position).await,
            PersistStep::UpdateTextCell { id, update } => store.update_text_cell(*id, update).await,
            PersistStep::DeleteParameter(id) => store.delete_parameter(*id).await,
            PersistStep::DeleteTextCell(id) => store.delete_text_cell(*id).await,
        };
        if let Err(err) = outcome {
            warn!(section_id, applied, total, "persistence interrupted: {err}");
            return Err(FormGridError::Interrupted {
                applied,
                total,
                source: Box::new(err),
            });
        }
    }
    Ok(total)
}
