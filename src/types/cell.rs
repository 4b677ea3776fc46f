use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FormGridError, Result};

/// Stable identity of a placed cell, independent of its position.
///
/// Parameter cells and text cells live in separate tables, so their numeric
/// ids may collide; the kind is part of the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum CellId {
    Parameter(u64),
    Text(u64),
}

impl CellId {
    pub fn raw(self) -> u64 {
        match self {
            CellId::Parameter(id) | CellId::Text(id) => id,
        }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellId::Parameter(id) => write!(f, "param-{id}"),
            CellId::Text(id) => write!(f, "text-{id}"),
        }
    }
}

/// Row, column and horizontal span of a cell (all 1-based, span >= 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub row: u32,
    pub column: u32,
    pub span: u32,
}

impl Placement {
    pub fn new(row: u32, column: u32, span: u32) -> Self {
        Self { row, column, span }
    }

    /// Last column covered by this placement (inclusive).
    pub fn end_column(&self) -> u32 {
        self.column.saturating_add(self.span.max(1)).saturating_sub(1)
    }

    /// True if both placements are in the same row and their
    /// `[column, column + span)` intervals intersect.
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.row == other.row
            && self.column <= other.end_column()
            && other.column <= self.end_column()
    }

    /// Same column and span, one row further down.
    pub fn shifted_down(self) -> Self {
        Self {
            row: self.row.saturating_add(1),
            ..self
        }
    }

    /// Same column and span, one row further up.
    pub fn shifted_up(self) -> Self {
        Self {
            row: self.row.saturating_sub(1).max(1),
            ..self
        }
    }
}

/// A cell record as the persistence layer returns it.
///
/// Parameter cells and text cells share this shape; which one a record is
/// gets decided by [`RawCell::classify`] from the fields that are present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCell {
    pub id: u64,
    /// Reference to the reusable parameter definition (opaque).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<serde_json::Value>,
    /// Static label content; its presence makes the record a text cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_row: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_span: Option<u32>,
    /// Fields this crate does not interpret, kept for write-back.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawCell {
    /// Parameter cell iff a parameter reference is present and no text
    /// content is.
    pub fn is_parameter(&self) -> bool {
        self.parameter
            .as_ref()
            .is_some_and(|p| !p.is_null())
            && self.content.is_none()
    }

    /// Turn the record into a typed cell.
    ///
    /// Parameter cells default missing position fields to 1. Text cells
    /// have no defaults, so a text record lacking one is malformed.
    pub fn classify(&self) -> Result<Cell> {
        if self.is_parameter() {
            return Ok(Cell::Parameter(ParameterCell {
                id: self.id,
                parameter: self.parameter.clone().unwrap_or_default(),
                placement: Placement {
                    row: self.grid_row.unwrap_or(1).max(1),
                    column: self.grid_column.unwrap_or(1).max(1),
                    span: self.grid_span.unwrap_or(1).max(1),
                },
            }));
        }

        let field = |value: Option<u32>, name: &str| {
            value
                .filter(|v| *v >= 1)
                .ok_or_else(|| FormGridError::MalformedCell {
                    id: self.id,
                    reason: format!("text cell without a valid {name}"),
                })
        };

        Ok(Cell::Text(TextCell {
            id: self.id,
            placement: Placement {
                row: field(self.grid_row, "grid_row")?,
                column: field(self.grid_column, "grid_column")?,
                span: field(self.grid_span, "grid_span")?,
            },
            content: self.content.clone().unwrap_or_default(),
            style: self.style.clone(),
        }))
    }
}

/// A cell bound to a parameter definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterCell {
    pub id: u64,
    pub parameter: serde_json::Value,
    #[serde(flatten)]
    pub placement: Placement,
}

/// A static label cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCell {
    pub id: u64,
    #[serde(flatten)]
    pub placement: Placement,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
}

/// A positioned unit in a section's grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Cell {
    Parameter(ParameterCell),
    Text(TextCell),
}

impl Cell {
    pub fn id(&self) -> CellId {
        match self {
            Cell::Parameter(p) => CellId::Parameter(p.id),
            Cell::Text(t) => CellId::Text(t.id),
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            Cell::Parameter(p) => p.placement,
            Cell::Text(t) => t.placement,
        }
    }

    pub fn set_placement(&mut self, placement: Placement) {
        match self {
            Cell::Parameter(p) => p.placement = placement,
            Cell::Text(t) => t.placement = placement,
        }
    }

    pub fn row(&self) -> u32 {
        self.placement().row
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Cell::Parameter(_))
    }
}

/// Id carried as a floating-point number (JavaScript callers), if it is
/// a whole, non-negative value that `f64` represents exactly.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn id_from_number(value: f64) -> Option<u64> {
    const MAX_EXACT: f64 = 9_007_199_254_740_991.0;
    let whole = value.is_finite()
        && (0.0..=MAX_EXACT).contains(&value)
        && value.fract().abs() < f64::EPSILON;
    whole.then_some(value as u64)
}
