use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::{Cell, CellId, RawCell};

/// Declared column count per row, keyed by 1-based row number.
///
/// On the wire the keys are row numbers as strings. Entries that do not
/// parse as positive integers are dropped on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    #[serde(default, deserialize_with = "lenient_rows_columns")]
    pub rows_columns: BTreeMap<u32, u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn lenient_rows_columns<'de, D>(deserializer: D) -> Result<BTreeMap<u32, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    let mut rows = BTreeMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let row = key.trim().parse::<u32>().ok().filter(|r| *r >= 1);
        let columns = value
            .as_u64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .and_then(|c| u32::try_from(c).ok())
            .filter(|c| *c >= 1);
        match (row, columns) {
            (Some(row), Some(columns)) => {
                rows.insert(row, columns);
            }
            _ => warn!("ignoring rows_columns entry {key:?} = {value}"),
        }
    }
    Ok(rows)
}

/// A section's layout configuration.
///
/// Only `grid_config.rows_columns` is interpreted; everything else is
/// carried through untouched so writes do not clobber it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfiguration {
    #[serde(default)]
    pub grid_config: GridLayout,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LayoutConfiguration {
    /// Explicitly configured column count for `row`, if any.
    pub fn columns(&self, row: u32) -> Option<u32> {
        self.grid_config.rows_columns.get(&row).copied()
    }

    pub fn rows_columns(&self) -> &BTreeMap<u32, u32> {
        &self.grid_config.rows_columns
    }

    /// Highest configured row number, 0 if none.
    pub fn max_row(&self) -> u32 {
        self.grid_config
            .rows_columns
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0)
    }

    /// Copy of this configuration with a different row map.
    pub fn with_rows_columns(&self, rows_columns: BTreeMap<u32, u32>) -> Self {
        let mut next = self.clone();
        next.grid_config.rows_columns = rows_columns;
        next
    }
}

/// A named container of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(default)]
    pub config: LayoutConfiguration,
}

/// Authoritative state of one section as fetched from the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionSnapshot {
    pub section: Section,
    #[serde(default)]
    pub parameters: Vec<RawCell>,
    #[serde(default)]
    pub text_cells: Vec<RawCell>,
}

impl SectionSnapshot {
    /// Every well-formed cell, classified by shape.
    ///
    /// Parameter cells come first, then text cells, regardless of which
    /// list a record arrived in. Malformed records are skipped.
    pub fn cells(&self) -> Vec<Cell> {
        let mut parameters = Vec::new();
        let mut texts = Vec::new();
        for raw in self.parameters.iter().chain(&self.text_cells) {
            match raw.classify() {
                Ok(cell @ Cell::Parameter(_)) => parameters.push(cell),
                Ok(cell @ Cell::Text(_)) => texts.push(cell),
                Err(err) => warn!("skipping cell: {err}"),
            }
        }
        parameters.extend(texts);
        parameters
    }

    /// Raw record backing a classified cell.
    pub fn raw(&self, id: CellId) -> Option<&RawCell> {
        let want_parameter = matches!(id, CellId::Parameter(_));
        self.parameters
            .iter()
            .chain(&self.text_cells)
            .find(|raw| raw.id == id.raw() && raw.is_parameter() == want_parameter)
    }
}
