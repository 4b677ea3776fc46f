//! Editor configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PresentationMode;

/// Maximum number of columns a row may declare.
pub const MAX_COLUMNS: u32 = 5;

/// Column count given to every freshly inserted row.
pub const NEW_ROW_COLUMNS: u32 = 3;

/// What to do with a position write that would overlap another cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictPolicy {
    /// Refuse the write with `FormGridError::Conflict`.
    #[default]
    Reject,
    /// Accept the write; the grid shows whichever cell was written last.
    LastWriteWins,
}

/// Settings for a [`SectionEditor`](crate::editor::SectionEditor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub mode: PresentationMode,
    pub conflicts: ConflictPolicy,
}

impl GridConfig {
    pub fn with_mode(mode: PresentationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
