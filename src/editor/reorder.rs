//! Drag-and-drop repositioning of single cells.
//!
//! The controller is a small state machine, `Idle -> Dragging -> Idle`, fed
//! by pointer or keyboard input. It never writes anything itself: a drop
//! onto a valid slot yields a [`CellMove`] for the editor to commit, and
//! every other ending leaves no trace.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::layout::{occupancy, Grid};
use crate::types::{Cell, CellId, Placement, PresentationMode};

/// Keyboard movement of the hover candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Slot currently under the dragged cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropCandidate {
    pub row: u32,
    pub column: u32,
    /// Whether dropping here would commit a move.
    pub valid: bool,
}

/// Data for an ongoing drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragData {
    /// The cell being dragged, as it was when the drag started.
    pub cell: Cell,
    pub hover: Option<DropCandidate>,
}

impl DragData {
    pub fn origin(&self) -> Placement {
        self.cell.placement()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragData),
}

/// A committed drop: move `cell` to `to`, keeping its span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellMove {
    pub cell: Cell,
    pub to: Placement,
}

#[derive(Debug, Clone, Default)]
pub struct ReorderController {
    mode: PresentationMode,
    state: DragState,
}

impl ReorderController {
    pub fn new(mode: PresentationMode) -> Self {
        Self {
            mode,
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn active(&self) -> Option<CellId> {
        match &self.state {
            DragState::Dragging(data) => Some(data.cell.id()),
            DragState::Idle => None,
        }
    }

    pub fn hover_candidate(&self) -> Option<DropCandidate> {
        match &self.state {
            DragState::Dragging(data) => data.hover,
            DragState::Idle => None,
        }
    }

    /// Pick up a placed cell.
    ///
    /// Returns false outside admin mode, while another drag is in progress,
    /// or when the cell is not placed in `grid`.
    pub fn begin(&mut self, grid: &Grid, id: CellId) -> bool {
        if !self.mode.allows_structure_edits() || self.is_dragging() {
            return false;
        }
        let Some(cell) = grid.find(id) else {
            return false;
        };
        trace!(cell = %id, "drag start");
        self.state = DragState::Dragging(DragData {
            cell: cell.clone(),
            hover: None,
        });
        true
    }

    /// Move the hover candidate to `(row, column)`.
    pub fn hover(&mut self, grid: &Grid, row: u32, column: u32) -> Option<DropCandidate> {
        let DragState::Dragging(data) = &mut self.state else {
            return None;
        };
        let target = Placement::new(row, column, data.cell.placement().span);
        let candidate = DropCandidate {
            row,
            column,
            valid: accepts(grid, &data.cell, &target),
        };
        data.hover = Some(candidate);
        Some(candidate)
    }

    /// Pointer left every slot.
    pub fn leave(&mut self) {
        if let DragState::Dragging(data) = &mut self.state {
            data.hover = None;
        }
    }

    /// Step the hover candidate one slot, starting from the origin if
    /// nothing is hovered yet. Stays inside the grid.
    pub fn nudge(&mut self, grid: &Grid, direction: Direction) -> Option<DropCandidate> {
        let DragState::Dragging(data) = &self.state else {
            return None;
        };
        if grid.row_count == 0 {
            return None;
        }
        let (row, column) = data
            .hover
            .map_or((data.origin().row, data.origin().column), |h| (h.row, h.column));
        let (row, column) = match direction {
            Direction::Up => (row.saturating_sub(1).max(1), column),
            Direction::Down => (row.saturating_add(1).min(grid.row_count), column),
            Direction::Left => (row, column.saturating_sub(1).max(1)),
            Direction::Right => (row, column.saturating_add(1)),
        };
        let row = row.min(grid.row_count);
        let column = column.min(grid.columns_of(row)).max(1);
        self.hover(grid, row, column)
    }

    /// Abandon the drag. Nothing is persisted.
    pub fn cancel(&mut self) {
        if let DragState::Dragging(data) = std::mem::take(&mut self.state) {
            trace!(cell = %data.cell.id(), "drag cancelled");
        }
    }

    /// Release the dragged cell over the current hover candidate.
    ///
    /// Returns the move to commit, or `None` when the drop is a no-op
    /// (no candidate, invalid slot, or the cell's own slot). The controller
    /// is idle afterwards either way.
    pub fn release(&mut self, grid: &Grid) -> Option<CellMove> {
        let DragState::Dragging(data) = std::mem::take(&mut self.state) else {
            return None;
        };
        let Some(hover) = data.hover else {
            trace!(cell = %data.cell.id(), "dropped outside the grid");
            return None;
        };
        let to = Placement::new(hover.row, hover.column, data.origin().span);
        if to == data.origin() || !accepts(grid, &data.cell, &to) {
            trace!(cell = %data.cell.id(), row = to.row, column = to.column, "drop ignored");
            return None;
        }
        trace!(cell = %data.cell.id(), row = to.row, column = to.column, "drop");
        Some(CellMove { cell: data.cell, to })
    }
}

/// Whether `cell` may land at `target` without leaving the grid or covering
/// any other cell.
fn accepts(grid: &Grid, cell: &Cell, target: &Placement) -> bool {
    occupancy::fits(grid, target) && occupancy::overlapping(grid, target, Some(cell.id())).is_none()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::layout::build_grid_from_cells;
    use crate::types::{LayoutConfiguration, ParameterCell, TextCell};
    use std::collections::BTreeMap;

    fn grid(mode: PresentationMode) -> Grid {
        let config = LayoutConfiguration::default()
            .with_rows_columns(BTreeMap::from([(1, 3), (2, 4)]));
        let cells = [
            Cell::Parameter(ParameterCell {
                id: 1,
                parameter: serde_json::json!(1),
                placement: Placement::new(1, 1, 2),
            }),
            Cell::Text(TextCell {
                id: 2,
                placement: Placement::new(1, 3, 1),
                content: "label".into(),
                style: None,
            }),
        ];
        build_grid_from_cells(&config, &cells, mode)
    }

    #[test]
    fn test_drag_disabled_outside_admin() {
        for mode in [PresentationMode::View, PresentationMode::Editable] {
            let g = grid(mode);
            let mut controller = ReorderController::new(mode);
            assert!(!controller.begin(&g, CellId::Parameter(1)));
            assert_eq!(controller.state(), &DragState::Idle);
        }
    }

    #[test]
    fn test_begin_requires_placed_cell() {
        let g = grid(PresentationMode::Admin);
        let mut controller = ReorderController::new(PresentationMode::Admin);
        assert!(!controller.begin(&g, CellId::Parameter(9)));
        assert!(controller.begin(&g, CellId::Parameter(1)));
        assert!(!controller.begin(&g, CellId::Text(2)));
        assert_eq!(controller.active(), Some(CellId::Parameter(1)));
    }

    #[test]
    fn test_drop_on_own_slot_is_noop() {
        let g = grid(PresentationMode::Admin);
        let mut controller = ReorderController::new(PresentationMode::Admin);
        controller.begin(&g, CellId::Parameter(1));
        let candidate = controller.hover(&g, 1, 1).unwrap();
        assert!(candidate.valid);
        assert_eq!(controller.release(&g), None);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_drop_onto_occupied_is_noop() {
        let g = grid(PresentationMode::Admin);
        let mut controller = ReorderController::new(PresentationMode::Admin);
        controller.begin(&g, CellId::Text(2));
        assert!(!controller.hover(&g, 1, 2).unwrap().valid);
        assert_eq!(controller.release(&g), None);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_drop_keeps_span() {
        let g = grid(PresentationMode::Admin);
        let mut controller = ReorderController::new(PresentationMode::Admin);
        controller.begin(&g, CellId::Parameter(1));
        controller.hover(&g, 2, 3);
        let commit = controller.release(&g).unwrap();
        assert_eq!(commit.to, Placement::new(2, 3, 2));
        assert_eq!(commit.cell.id(), CellId::Parameter(1));
    }

    #[test]
    fn test_span_must_fit_row() {
        let g = grid(PresentationMode::Admin);
        let mut controller = ReorderController::new(PresentationMode::Admin);
        controller.begin(&g, CellId::Parameter(1));
        assert!(!controller.hover(&g, 2, 4).unwrap().valid);
        assert!(!controller.hover(&g, 3, 1).unwrap().valid);
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let g = grid(PresentationMode::Admin);
        let mut controller = ReorderController::new(PresentationMode::Admin);
        controller.begin(&g, CellId::Parameter(1));
        controller.hover(&g, 2, 1);
        controller.cancel();
        assert_eq!(controller.state(), &DragState::Idle);
        assert_eq!(controller.release(&g), None);
    }

    #[test]
    fn test_keyboard_nudge_clamps() {
        let g = grid(PresentationMode::Admin);
        let mut controller = ReorderController::new(PresentationMode::Admin);
        controller.begin(&g, CellId::Text(2));
        let c = controller.nudge(&g, Direction::Right).unwrap();
        assert_eq!((c.row, c.column), (1, 3));
        let c = controller.nudge(&g, Direction::Down).unwrap();
        assert_eq!((c.row, c.column), (2, 3));
        let c = controller.nudge(&g, Direction::Down).unwrap();
        assert_eq!((c.row, c.column), (2, 3));
        let c = controller.nudge(&g, Direction::Right).unwrap();
        assert_eq!((c.row, c.column), (2, 4));
        assert!(c.valid);
        let commit = controller.release(&g).unwrap();
        assert_eq!(commit.to, Placement::new(2, 4, 1));
    }
}
