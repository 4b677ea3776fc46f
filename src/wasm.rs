//! Browser bindings.
//!
//! Every async export takes the JavaScript store object described in
//! [`JsStore`], builds a fresh [`SectionEditor`] around it and runs one
//! operation. Nothing is cached between calls; the UI refetches the grid
//! with `loadGrid` after each one.
//!
//! ```javascript
//! const grid = await loadGrid(store, sectionId, "admin");
//! await insertRowAfter(store, sectionId, 2);
//! const drag = new DragSession(await loadGrid(store, sectionId, "admin"));
//! drag.begin({ kind: "parameter", id: 7 });
//! drag.hover(2, 3);
//! const move = drag.release();
//! if (move) await commitMove(store, sectionId, move);
//! ```

use js_sys::Object;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::config::GridConfig;
use crate::editor::{CellMove, Direction, ReorderController, SectionEditor};
use crate::layout::{build_grid, build_grid_from_cells, Grid};
use crate::store::JsStore;
use crate::types::{
    id_from_number, Cell, CellId, LayoutConfiguration, Placement, PresentationMode, SectionSnapshot,
};

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_mode(mode: &str) -> Result<PresentationMode, JsValue> {
    mode.parse().map_err(|e: String| JsValue::from_str(&e))
}

fn id_from_js(value: f64) -> Result<u64, JsValue> {
    id_from_number(value).ok_or_else(|| JsValue::from_str(&format!("invalid id {value}")))
}

fn admin_editor(store: Object, section_id: f64) -> Result<SectionEditor<JsStore>, JsValue> {
    console_error_panic_hook::set_once();
    Ok(SectionEditor::new(
        JsStore::new(store),
        id_from_js(section_id)?,
        GridConfig::with_mode(PresentationMode::Admin),
    ))
}

/// Build the grid for an already fetched section snapshot.
#[wasm_bindgen(js_name = "buildGrid")]
pub fn build_grid_js(snapshot: JsValue, mode: &str) -> Result<JsValue, JsValue> {
    let snapshot: SectionSnapshot = from_js(snapshot)?;
    to_js(&build_grid(&snapshot, parse_mode(mode)?))
}

/// Fetch a section through the store and build its grid.
#[wasm_bindgen(js_name = "loadGrid")]
pub async fn load_grid(store: Object, section_id: f64, mode: String) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();
    let config = GridConfig::with_mode(parse_mode(&mode)?);
    let mut editor = SectionEditor::new(JsStore::new(store), id_from_js(section_id)?, config);
    to_js(editor.grid().await?)
}

#[wasm_bindgen(js_name = "applyColumnCount")]
pub async fn apply_column_count(
    store: Object,
    section_id: f64,
    row: u32,
    columns: u32,
) -> Result<(), JsValue> {
    let mut editor = admin_editor(store, section_id)?;
    Ok(editor.apply_column_count(row, columns).await?)
}

#[wasm_bindgen(js_name = "insertRowBefore")]
pub async fn insert_row_before(store: Object, section_id: f64, row: u32) -> Result<(), JsValue> {
    let mut editor = admin_editor(store, section_id)?;
    Ok(editor.insert_row_before(row).await?)
}

#[wasm_bindgen(js_name = "insertRowAfter")]
pub async fn insert_row_after(store: Object, section_id: f64, row: u32) -> Result<(), JsValue> {
    let mut editor = admin_editor(store, section_id)?;
    Ok(editor.insert_row_after(row).await?)
}

#[wasm_bindgen(js_name = "deleteRow")]
pub async fn delete_row(store: Object, section_id: f64, row: u32) -> Result<(), JsValue> {
    let mut editor = admin_editor(store, section_id)?;
    Ok(editor.delete_row(row).await?)
}

#[wasm_bindgen(js_name = "initializeFirstRow")]
pub async fn initialize_first_row(store: Object, section_id: f64) -> Result<(), JsValue> {
    let mut editor = admin_editor(store, section_id)?;
    Ok(editor.initialize_first_row().await?)
}

#[wasm_bindgen(js_name = "moveParameter")]
pub async fn move_parameter(
    store: Object,
    section_id: f64,
    id: f64,
    row: u32,
    column: u32,
    span: u32,
) -> Result<(), JsValue> {
    let mut editor = admin_editor(store, section_id)?;
    let to = Placement::new(row, column, span);
    Ok(editor.move_parameter(id_from_js(id)?, to).await?)
}

#[allow(clippy::too_many_arguments)]
#[wasm_bindgen(js_name = "moveOrEditTextCell")]
pub async fn move_or_edit_text_cell(
    store: Object,
    section_id: f64,
    id: f64,
    row: u32,
    column: u32,
    span: u32,
    content: String,
    style: JsValue,
) -> Result<(), JsValue> {
    let mut editor = admin_editor(store, section_id)?;
    let style: Option<serde_json::Value> = if style.is_undefined() || style.is_null() {
        None
    } else {
        Some(from_js(style)?)
    };
    let to = Placement::new(row, column, span);
    Ok(editor
        .move_or_edit_text_cell(id_from_js(id)?, to, content, style)
        .await?)
}

#[wasm_bindgen(js_name = "deleteParameter")]
pub async fn delete_parameter(store: Object, section_id: f64, id: f64) -> Result<(), JsValue> {
    let mut editor = admin_editor(store, section_id)?;
    Ok(editor.delete_parameter(id_from_js(id)?).await?)
}

#[wasm_bindgen(js_name = "deleteTextCell")]
pub async fn delete_text_cell(store: Object, section_id: f64, id: f64) -> Result<(), JsValue> {
    let mut editor = admin_editor(store, section_id)?;
    Ok(editor.delete_text_cell(id_from_js(id)?).await?)
}

/// Persist a move returned by [`DragSession::release`].
#[wasm_bindgen(js_name = "commitMove")]
pub async fn commit_move(store: Object, section_id: f64, released: JsValue) -> Result<(), JsValue> {
    let released: CellMove = from_js(released)?;
    let mut editor = admin_editor(store, section_id)?;
    Ok(editor.commit_move(released).await?)
}

/// Drag state over one built grid, driven from pointer and keyboard events.
#[wasm_bindgen]
pub struct DragSession {
    grid: Grid,
    controller: ReorderController,
}

#[wasm_bindgen]
impl DragSession {
    /// Start a session over a grid returned by `buildGrid` or `loadGrid`.
    #[wasm_bindgen(constructor)]
    pub fn new(grid: JsValue) -> Result<DragSession, JsValue> {
        let grid = from_js::<GridInput>(grid)?.rebuild();
        Ok(DragSession {
            controller: ReorderController::new(grid.mode),
            grid,
        })
    }

    pub fn begin(&mut self, id: JsValue) -> Result<bool, JsValue> {
        let id: CellId = from_js(id)?;
        Ok(self.controller.begin(&self.grid, id))
    }

    pub fn hover(&mut self, row: u32, column: u32) -> Result<JsValue, JsValue> {
        to_js(&self.controller.hover(&self.grid, row, column))
    }

    pub fn leave(&mut self) {
        self.controller.leave();
    }

    pub fn nudge(&mut self, direction: JsValue) -> Result<JsValue, JsValue> {
        let direction: Direction = from_js(direction)?;
        to_js(&self.controller.nudge(&self.grid, direction))
    }

    pub fn cancel(&mut self) {
        self.controller.cancel();
    }

    /// The move to pass to `commitMove`, or `null` for a no-op drop.
    pub fn release(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.release(&self.grid))
    }
}

/// The parts of a serialized grid needed to rebuild it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridInput {
    mode: PresentationMode,
    rows: Vec<RowInput>,
    cells: Vec<Cell>,
    #[serde(default)]
    overwritten: Vec<Cell>,
}

#[derive(Deserialize)]
struct RowInput {
    row: u32,
    columns: u32,
}

impl GridInput {
    fn rebuild(self) -> Grid {
        let rows = self.rows.into_iter().map(|r| (r.row, r.columns)).collect();
        let config = LayoutConfiguration::default().with_rows_columns(rows);
        // Hidden cells first so the visible ones displace them again.
        let mut cells = self.overwritten;
        cells.extend(self.cells);
        build_grid_from_cells(&config, &cells, self.mode)
    }
}
