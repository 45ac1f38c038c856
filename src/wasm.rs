//! WebAssembly bindings for scenefit

use crate::{SceneClassifier, SceneReport};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmClassifier {
    classifier: SceneClassifier,
}

#[wasm_bindgen]
impl WasmClassifier {
    /// Create a classifier using the standard scene table
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmClassifier {
        WasmClassifier {
            classifier: SceneClassifier::default(),
        }
    }

    #[wasm_bindgen]
    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<(), JsValue> {
        self.classifier = self
            .classifier
            .clone()
            .with_tolerance(tolerance)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(())
    }

    /// Classify dimensions and return the report as a plain JS object
    #[wasm_bindgen]
    pub fn classify(&self, width: u32, height: u32) -> Result<JsValue, JsValue> {
        let report = self
            .classifier
            .classify(width, height)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&report)
    }
}

impl Default for WasmClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot classification against the standard scene table
#[wasm_bindgen]
pub fn classify_dimensions(width: u32, height: u32) -> Result<JsValue, JsValue> {
    let report = crate::classify(width, height).map_err(|e| {
        web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
        JsValue::from_str(&e.to_string())
    })?;
    to_js(&report)
}

fn to_js(report: &SceneReport) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(report).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}
