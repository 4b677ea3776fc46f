//! Structural editing of one section.
//!
//! `SectionEditor` sits between the admin UI and a [`SectionStore`], adding:
//! - A cached snapshot + grid, dropped after every write
//! - Row insertion/deletion/resizing (see [`rows`])
//! - Single-cell moves, edits and deletes with placement checks
//! - Drag-and-drop via [`ReorderController`]
//!
//! The cache is never patched locally. After any write, successful or not,
//! the next read fetches the section again.

mod reorder;
pub mod rows;

use tracing::debug;

use crate::config::{ConflictPolicy, GridConfig};
use crate::error::{FormGridError, Result};
use crate::layout::{build_grid, occupancy, Grid};
use crate::store::{PositionUpdate, SectionStore, TextCellUpdate};
use crate::types::{Cell, CellId, Placement, SectionSnapshot, TextCell};

pub use reorder::{CellMove, Direction, DragData, DragState, DropCandidate, ReorderController};
pub use rows::{execute_plan, plan_row_operation, PersistStep, RowOperation, RowPlan};

/// Fetched state and the grid built from it.
struct Loaded {
    snapshot: SectionSnapshot,
    grid: Grid,
}

pub struct SectionEditor<S> {
    store: S,
    section_id: u64,
    config: GridConfig,
    loaded: Option<Loaded>,
    reorder: ReorderController,
}

impl<S: SectionStore> SectionEditor<S> {
    pub fn new(store: S, section_id: u64, config: GridConfig) -> Self {
        Self {
            store,
            section_id,
            config,
            loaded: None,
            reorder: ReorderController::new(config.mode),
        }
    }

    pub fn section_id(&self) -> u64 {
        self.section_id
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Forget the cached section so the next read refetches it.
    pub fn invalidate(&mut self) {
        if self.loaded.take().is_some() {
            debug!(section_id = self.section_id, "section cache invalidated");
        }
    }

    pub fn is_cached(&self) -> bool {
        self.loaded.is_some()
    }

    async fn load(&mut self) -> Result<&Loaded> {
        if self.loaded.is_none() {
            let snapshot = self.store.fetch_section(self.section_id).await?;
            let grid = build_grid(&snapshot, self.config.mode);
            self.loaded = Some(Loaded { snapshot, grid });
        }
        self.loaded
            .as_ref()
            .ok_or_else(|| FormGridError::Other("section not loaded".into()))
    }

    /// The section as last fetched.
    pub async fn snapshot(&mut self) -> Result<&SectionSnapshot> {
        Ok(&self.load().await?.snapshot)
    }

    /// The grid of the section as last fetched.
    pub async fn grid(&mut self) -> Result<&Grid> {
        Ok(&self.load().await?.grid)
    }

    fn require_admin(&self) -> Result<()> {
        if self.config.mode.allows_structure_edits() {
            Ok(())
        } else {
            Err(FormGridError::ReadOnly {
                mode: self.config.mode,
            })
        }
    }

    /// Plan and run a row operation, then drop the cache.
    pub async fn apply(&mut self, operation: RowOperation) -> Result<RowPlan> {
        self.require_admin()?;
        let plan = plan_row_operation(self.snapshot().await?, operation)?;
        debug!(
            section_id = self.section_id,
            ?operation,
            steps = plan.steps.len(),
            "applying row operation"
        );
        let outcome = execute_plan(&mut self.store, self.section_id, &plan).await;
        self.invalidate();
        outcome.map(|_| plan)
    }

    /// Set the declared column count of `row`.
    pub async fn apply_column_count(&mut self, row: u32, columns: u32) -> Result<()> {
        self.apply(RowOperation::SetColumns { row, columns }).await.map(drop)
    }

    pub async fn insert_row_before(&mut self, row: u32) -> Result<()> {
        self.apply(RowOperation::InsertBefore { row }).await.map(drop)
    }

    pub async fn insert_row_after(&mut self, row: u32) -> Result<()> {
        self.apply(RowOperation::InsertAfter { row }).await.map(drop)
    }

    /// Delete `row` and every cell in it. There is no emptiness check.
    pub async fn delete_row(&mut self, row: u32) -> Result<()> {
        self.apply(RowOperation::Delete { row }).await.map(drop)
    }

    /// Give a section without rows a single row of the default width.
    pub async fn initialize_first_row(&mut self) -> Result<()> {
        self.apply(RowOperation::InitializeFirstRow).await.map(drop)
    }

    fn reject_overlap(&self) -> bool {
        self.config.conflicts == ConflictPolicy::Reject
    }

    /// Stored cell by id, including ones hidden or out of bounds.
    async fn cell(&mut self, id: CellId) -> Result<Cell> {
        self.snapshot()
            .await?
            .cells()
            .into_iter()
            .find(|cell| cell.id() == id)
            .ok_or(FormGridError::CellNotFound(id))
    }

    /// Persist one single-cell step, then drop the cache.
    async fn write(&mut self, step: PersistStep) -> Result<()> {
        let steps = std::slice::from_ref(&step);
        let outcome = rows::execute_steps(&mut self.store, self.section_id, steps).await;
        self.invalidate();
        outcome.map(drop)
    }

    async fn check_target(&mut self, id: CellId, to: &Placement) -> Result<()> {
        let reject = self.reject_overlap();
        let grid = self.grid().await?;
        occupancy::check_placement(grid, to, Some(id), reject)
    }

    /// Move a parameter cell.
    pub async fn move_parameter(&mut self, id: u64, to: Placement) -> Result<()> {
        self.require_admin()?;
        let cell_id = CellId::Parameter(id);
        let current = self.cell(cell_id).await?;
        if current.placement() == to {
            return Ok(());
        }
        self.check_target(cell_id, &to).await?;
        self.write(PersistStep::MoveParameter {
            id,
            position: PositionUpdate::from(to),
        })
        .await
    }

    /// Move a text cell and/or change its content and style.
    pub async fn move_or_edit_text_cell(
        &mut self,
        id: u64,
        to: Placement,
        content: String,
        style: Option<serde_json::Value>,
    ) -> Result<()> {
        self.require_admin()?;
        let cell_id = CellId::Text(id);
        let current = self.cell(cell_id).await?;
        if current.placement() != to {
            self.check_target(cell_id, &to).await?;
        }
        let update = TextCellUpdate::moved(
            &TextCell {
                id,
                placement: to,
                content,
                style,
            },
            to,
        );
        self.write(PersistStep::UpdateTextCell { id, update }).await
    }

    pub async fn delete_parameter(&mut self, id: u64) -> Result<()> {
        self.require_admin()?;
        self.cell(CellId::Parameter(id)).await?;
        self.write(PersistStep::DeleteParameter(id)).await
    }

    pub async fn delete_text_cell(&mut self, id: u64) -> Result<()> {
        self.require_admin()?;
        self.cell(CellId::Text(id)).await?;
        self.write(PersistStep::DeleteTextCell(id)).await
    }

    // ---- Drag and drop ----

    pub fn reorder(&self) -> &ReorderController {
        &self.reorder
    }

    /// Pick up a cell. Returns false if dragging is not possible.
    pub async fn begin_drag(&mut self, id: CellId) -> Result<bool> {
        self.load().await?;
        let Some(loaded) = &self.loaded else {
            return Ok(false);
        };
        Ok(self.reorder.begin(&loaded.grid, id))
    }

    pub fn hover(&mut self, row: u32, column: u32) -> Option<DropCandidate> {
        let loaded = self.loaded.as_ref()?;
        self.reorder.hover(&loaded.grid, row, column)
    }

    /// Pointer left every slot; releasing now does nothing.
    pub fn leave(&mut self) {
        self.reorder.leave();
    }

    pub fn nudge(&mut self, direction: Direction) -> Option<DropCandidate> {
        let loaded = self.loaded.as_ref()?;
        self.reorder.nudge(&loaded.grid, direction)
    }

    pub fn cancel_drag(&mut self) {
        self.reorder.cancel();
    }

    /// Release the dragged cell and commit the move if the drop is valid.
    ///
    /// Returns the committed placement, or `None` for a no-op drop. A failed
    /// commit leaves the cache invalidated so the UI rebuilds from the
    /// store rather than from where the cell was dropped.
    pub async fn finish_drag(&mut self) -> Result<Option<Placement>> {
        let released = match &self.loaded {
            Some(loaded) => self.reorder.release(&loaded.grid),
            None => {
                self.reorder.cancel();
                None
            }
        };
        let Some(released) = released else {
            return Ok(None);
        };
        let to = released.to;
        self.commit(released).await?;
        Ok(Some(to))
    }

    /// Commit a move produced by a controller held elsewhere, checking it
    /// against the section as it is now.
    pub async fn commit_move(&mut self, released: CellMove) -> Result<()> {
        self.require_admin()?;
        let id = released.cell.id();
        let current = self.cell(id).await?;
        if current.placement() == released.to {
            return Ok(());
        }
        self.check_target(id, &released.to).await?;
        self.commit(released).await
    }

    async fn commit(&mut self, released: CellMove) -> Result<()> {
        let CellMove { cell, to } = released;
        let step = match &cell {
            Cell::Parameter(p) => PersistStep::MoveParameter {
                id: p.id,
                position: PositionUpdate::from(to),
            },
            Cell::Text(t) => PersistStep::UpdateTextCell {
                id: t.id,
                update: TextCellUpdate::moved(t, to),
            },
        };
        self.write(step).await
    }
}
