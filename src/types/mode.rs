use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a section is being presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresentationMode {
    /// Read-only display, no empty-state affordance
    View,
    /// Fill-in forms, no structural editing
    Editable,
    /// Full structural editing and drag-and-drop
    #[default]
    Admin,
}

impl PresentationMode {
    /// Whether rows may be inserted/deleted and cells dragged.
    pub fn allows_structure_edits(self) -> bool {
        self == PresentationMode::Admin
    }
}

impl fmt::Display for PresentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PresentationMode::View => "view",
            PresentationMode::Editable => "editable",
            PresentationMode::Admin => "admin",
        })
    }
}

impl FromStr for PresentationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(PresentationMode::View),
            "editable" => Ok(PresentationMode::Editable),
            "admin" => Ok(PresentationMode::Admin),
            other => Err(format!("unknown presentation mode: {other}")),
        }
    }
}
