//! Test fixtures for building section snapshots in memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use fixtures::SnapshotBuilder;
//!
//! let snapshot = SnapshotBuilder::new(1)
//!     .rows(&[(1, 3), (2, 4)])
//!     .param(1, 1, 1, 2)
//!     .text(2, 2, 3, 1, "Notes")
//!     .build();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use formgrid::types::{LayoutConfiguration, RawCell, Section, SectionSnapshot};
use serde_json::json;

/// Builder for a [`SectionSnapshot`] with a configured row map and cells.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    id: u64,
    config: LayoutConfiguration,
    parameters: Vec<RawCell>,
    text_cells: Vec<RawCell>,
}

impl SnapshotBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Declare column counts per row.
    pub fn rows(mut self, rows: &[(u32, u32)]) -> Self {
        self.config = self
            .config
            .with_rows_columns(rows.iter().copied().collect());
        self
    }

    /// Use a layout configuration parsed from JSON, for wire-format cases.
    pub fn config_json(mut self, config: serde_json::Value) -> Self {
        self.config = serde_json::from_value(config).expect("valid layout configuration");
        self
    }

    pub fn param(mut self, id: u64, row: u32, column: u32, span: u32) -> Self {
        self.parameters.push(RawCell {
            id,
            parameter: Some(json!({ "id": id, "name": format!("field {id}") })),
            grid_row: Some(row),
            grid_column: Some(column),
            grid_span: Some(span),
            ..RawCell::default()
        });
        self
    }

    /// Parameter record with no position fields at all.
    pub fn unplaced_param(mut self, id: u64) -> Self {
        self.parameters.push(RawCell {
            id,
            parameter: Some(json!({ "id": id })),
            ..RawCell::default()
        });
        self
    }

    pub fn text(mut self, id: u64, row: u32, column: u32, span: u32, content: &str) -> Self {
        self.text_cells.push(RawCell {
            id,
            content: Some(content.to_string()),
            grid_row: Some(row),
            grid_column: Some(column),
            grid_span: Some(span),
            ..RawCell::default()
        });
        self
    }

    pub fn styled_text(
        mut self,
        id: u64,
        row: u32,
        column: u32,
        span: u32,
        content: &str,
        style: serde_json::Value,
    ) -> Self {
        self = self.text(id, row, column, span, content);
        if let Some(last) = self.text_cells.last_mut() {
            last.style = Some(style);
        }
        self
    }

    /// Push an arbitrary record into the text cell list.
    pub fn raw_text(mut self, record: serde_json::Value) -> Self {
        self.text_cells
            .push(serde_json::from_value(record).expect("valid cell record"));
        self
    }

    pub fn build(self) -> SectionSnapshot {
        SectionSnapshot {
            section: Section {
                id: self.id,
                code: Some(format!("S{}", self.id)),
                name: Some(format!("Section {}", self.id)),
                parent: None,
                config: self.config,
            },
            parameters: self.parameters,
            text_cells: self.text_cells,
        }
    }
}

/// Three rows of three columns:
///
/// ```text
/// row 1: [param 1][text 10][       ]
/// row 2: [param 2 ........][text 20]
/// row 3: [param 3][text 30 ........]
/// ```
pub fn three_row_section() -> SectionSnapshot {
    SnapshotBuilder::new(1)
        .rows(&[(1, 3), (2, 3), (3, 3)])
        .param(1, 1, 1, 1)
        .param(2, 2, 1, 2)
        .param(3, 3, 1, 1)
        .text(10, 1, 2, 1, "A")
        .styled_text(20, 2, 3, 1, "B", json!({ "bold": true }))
        .text(30, 3, 2, 2, "C")
        .build()
}

/// Section whose rows exist only because cells occupy them.
///
/// ```text
/// row 1: [param 1]
/// row 2: [param 2]
/// row 3: [       ][param 3]
/// ```
pub fn unconfigured_section() -> SectionSnapshot {
    SnapshotBuilder::new(2)
        .param(1, 1, 1, 1)
        .param(2, 2, 1, 1)
        .param(3, 3, 2, 1)
        .build()
}

pub fn empty_section() -> SectionSnapshot {
    SnapshotBuilder::new(3).build()
}
