//! In-process store.
//!
//! Applies writes to snapshots held in memory, keeps a log of every call and
//! can be told to fail a given write. The CLI runs row operations against it
//! and tests use it to observe the exact sequence of persistence calls.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::{PositionUpdate, SectionStore, TextCellUpdate};
use crate::error::{FormGridError, Result};
use crate::types::{LayoutConfiguration, Placement, RawCell, SectionSnapshot};

/// One call received by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    FetchSection(u64),
    UpdateLayout {
        section_id: u64,
        rows_columns: BTreeMap<u32, u32>,
    },
    MoveParameter {
        id: u64,
        placement: Placement,
    },
    UpdateTextCell {
        id: u64,
        placement: Placement,
    },
    DeleteParameter(u64),
    DeleteTextCell(u64),
}

impl StoreCall {
    pub fn is_write(&self) -> bool {
        !matches!(self, StoreCall::FetchSection(_))
    }
}

/// Sections keyed by id. Cell ids are global like a backend's primary
/// keys: a cell write finds its record in whichever section holds it, and
/// one id is never reused across sections of the same table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sections: HashMap<u64, SectionSnapshot>,
    calls: Vec<StoreCall>,
    writes: usize,
    fail_write: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(snapshot: SectionSnapshot) -> Self {
        let mut store = Self::new();
        store.insert(snapshot);
        store
    }

    pub fn insert(&mut self, snapshot: SectionSnapshot) {
        self.sections.insert(snapshot.section.id, snapshot);
    }

    pub fn section(&self, section_id: u64) -> Option<&SectionSnapshot> {
        self.sections.get(&section_id)
    }

    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }

    /// Calls that changed state, in issue order.
    pub fn writes(&self) -> Vec<&StoreCall> {
        self.calls.iter().filter(|call| call.is_write()).collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Make the `nth` write from now (1-based) fail once. Later writes
    /// succeed again.
    pub fn fail_nth_write(&mut self, nth: usize) {
        self.fail_write = Some(self.writes.saturating_add(nth));
    }

    fn begin_write(&mut self, call: StoreCall) -> Result<()> {
        self.writes = self.writes.saturating_add(1);
        if self.fail_write == Some(self.writes) {
            self.fail_write = None;
            debug!(?call, "injected store failure");
            return Err(FormGridError::Store(format!("write {} rejected", self.writes)));
        }
        self.calls.push(call);
        Ok(())
    }

    /// Record `id` of the parameter or text table, in any section.
    fn record_mut(&mut self, id: u64, parameter: bool) -> Option<&mut RawCell> {
        self.sections.values_mut().find_map(|snapshot| {
            snapshot
                .parameters
                .iter_mut()
                .chain(snapshot.text_cells.iter_mut())
                .find(|raw| raw.id == id && raw.is_parameter() == parameter)
        })
    }

    fn remove_record(&mut self, id: u64, parameter: bool) -> bool {
        for snapshot in self.sections.values_mut() {
            for list in [&mut snapshot.parameters, &mut snapshot.text_cells] {
                if let Some(idx) = list
                    .iter()
                    .position(|raw| raw.id == id && raw.is_parameter() == parameter)
                {
                    list.remove(idx);
                    return true;
                }
            }
        }
        false
    }
}

fn missing(what: &str, id: u64) -> FormGridError {
    FormGridError::Store(format!("{what} {id} not found"))
}

impl SectionStore for MemoryStore {
    async fn fetch_section(&mut self, section_id: u64) -> Result<SectionSnapshot> {
        self.calls.push(StoreCall::FetchSection(section_id));
        self.sections
            .get(&section_id)
            .cloned()
            .ok_or_else(|| missing("section", section_id))
    }

    async fn update_layout(&mut self, section_id: u64, config: &LayoutConfiguration) -> Result<()> {
        if !self.sections.contains_key(&section_id) {
            return Err(missing("section", section_id));
        }
        self.begin_write(StoreCall::UpdateLayout {
            section_id,
            rows_columns: config.rows_columns().clone(),
        })?;
        if let Some(snapshot) = self.sections.get_mut(&section_id) {
            snapshot.section.config = config.clone();
        }
        Ok(())
    }

    async fn move_parameter(&mut self, id: u64, position: PositionUpdate) -> Result<()> {
        if self.record_mut(id, true).is_none() {
            return Err(missing("parameter", id));
        }
        self.begin_write(StoreCall::MoveParameter {
            id,
            placement: position.placement(),
        })?;
        if let Some(raw) = self.record_mut(id, true) {
            raw.grid_row = Some(position.grid_row);
            raw.grid_column = Some(position.grid_column);
            raw.grid_span = Some(position.grid_span);
        }
        Ok(())
    }

    async fn update_text_cell(&mut self, id: u64, update: &TextCellUpdate) -> Result<()> {
        if self.record_mut(id, false).is_none() {
            return Err(missing("text cell", id));
        }
        self.begin_write(StoreCall::UpdateTextCell {
            id,
            placement: update.placement(),
        })?;
        if let Some(raw) = self.record_mut(id, false) {
            raw.grid_row = Some(update.grid_row);
            raw.grid_column = Some(update.grid_column);
            raw.grid_span = Some(update.grid_span);
            raw.content = Some(update.content.clone());
            raw.style = update.style.clone();
        }
        Ok(())
    }

    async fn delete_parameter(&mut self, id: u64) -> Result<()> {
        if self.record_mut(id, true).is_none() {
            return Err(missing("parameter", id));
        }
        self.begin_write(StoreCall::DeleteParameter(id))?;
        self.remove_record(id, true);
        Ok(())
    }

    async fn delete_text_cell(&mut self, id: u64) -> Result<()> {
        if self.record_mut(id, false).is_none() {
            return Err(missing("text cell", id));
        }
        self.begin_write(StoreCall::DeleteTextCell(id))?;
        self.remove_record(id, false);
        Ok(())
    }
}
