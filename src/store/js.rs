//! Store backed by a JavaScript object.
//!
//! The browser admin UI passes an object exposing one method per
//! persistence call; each method returns a Promise:
//!
//! ```javascript
//! const store = {
//!   fetchSection: (sectionId) => api.get(`/categories/${sectionId}/grid`),
//!   updateLayout: (sectionId, config) => api.patch(`/categories/${sectionId}`, { config }),
//!   moveParameter: (id, position) => api.patch(`/parameters/${id}/position`, position),
//!   updateTextCell: (id, body) => api.put(`/text-cells/${id}`, body),
//!   deleteParameter: (id) => api.delete(`/parameters/${id}`),
//!   deleteTextCell: (id) => api.delete(`/text-cells/${id}`),
//! };
//! ```

use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::{PositionUpdate, SectionStore, TextCellUpdate};
use crate::error::{FormGridError, Result};
use crate::types::{LayoutConfiguration, SectionSnapshot};

pub struct JsStore {
    target: Object,
}

impl JsStore {
    pub fn new(target: Object) -> Self {
        Self { target }
    }

    fn method(&self, name: &str) -> Result<Function> {
        Reflect::get(&self.target, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| FormGridError::Store(format!("store has no method {name}")))
    }

    async fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue> {
        let method = self.method(name)?;
        let returned = match args {
            [] => method.call0(&self.target),
            [a] => method.call1(&self.target, a),
            [a, b] => method.call2(&self.target, a, b),
            _ => return Err(FormGridError::Store(format!("{name}: too many arguments"))),
        }
        .map_err(|e| js_failure(name, &e))?;

        let promise = Promise::resolve(&returned);
        JsFuture::from(promise)
            .await
            .map_err(|e| js_failure(name, &e))
    }
}

fn js_failure(name: &str, err: &JsValue) -> FormGridError {
    let message = err
        .as_string()
        .or_else(|| {
            Reflect::get(err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{err:?}"));
    FormGridError::Store(format!("{name}: {message}"))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| FormGridError::Store(e.to_string()))
}

fn id_arg(id: u64) -> JsValue {
    // Ids are well inside the 2^53 range JavaScript numbers represent exactly.
    #[allow(clippy::cast_precision_loss)]
    JsValue::from_f64(id as f64)
}

impl SectionStore for JsStore {
    async fn fetch_section(&mut self, section_id: u64) -> Result<SectionSnapshot> {
        let value = self.call("fetchSection", &[id_arg(section_id)]).await?;
        serde_wasm_bindgen::from_value(value).map_err(|e| FormGridError::Store(e.to_string()))
    }

    async fn update_layout(&mut self, section_id: u64, config: &LayoutConfiguration) -> Result<()> {
        self.call("updateLayout", &[id_arg(section_id), to_js(config)?])
            .await
            .map(drop)
    }

    async fn move_parameter(&mut self, id: u64, position: PositionUpdate) -> Result<()> {
        self.call("moveParameter", &[id_arg(id), to_js(&position)?])
            .await
            .map(drop)
    }

    async fn update_text_cell(&mut self, id: u64, update: &TextCellUpdate) -> Result<()> {
        self.call("updateTextCell", &[id_arg(id), to_js(update)?])
            .await
            .map(drop)
    }

    async fn delete_parameter(&mut self, id: u64) -> Result<()> {
        self.call("deleteParameter", &[id_arg(id)]).await.map(drop)
    }

    async fn delete_text_cell(&mut self, id: u64) -> Result<()> {
        self.call("deleteTextCell", &[id_arg(id)]).await.map(drop)
    }
}
