//! WebAssembly bindings for the viewer core.
//!
//! Provides a thin wrapper around `ViewerSession` for browser environments.
//! File reading stays in JavaScript: the host hands over the bytes (or a
//! promise of them) and reads typed buffers back for the renderer.

use js_sys::{Promise, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::{
    decode::Statistic,
    schema::ViewerConfig,
    session::ViewerSession,
    shading::{Gradient, GradientScheme},
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WebAssembly wrapper for a viewer session.
#[wasm_bindgen]
pub struct WasmViewer {
    session: ViewerSession,
}

#[wasm_bindgen]
impl WasmViewer {
    /// Create a viewer from an optional JSON configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmViewer, JsValue> {
        let config = match config_json {
            Some(json) => ViewerConfig::from_json(&json).map_err(js_error)?,
            None => ViewerConfig::default(),
        };
        let session = ViewerSession::new(config).map_err(js_error)?;
        Ok(WasmViewer { session })
    }

    /// Decode point-cloud bytes. Returns the number of points.
    #[wasm_bindgen(js_name = loadGeometry)]
    pub fn load_geometry(&mut self, bytes: &[u8]) -> Result<usize, JsValue> {
        self.session.load_geometry(bytes).map_err(js_error)
    }

    /// Use a mesh loader's flat vertex buffer as the geometry.
    #[wasm_bindgen(js_name = loadMeshVertices)]
    pub fn load_mesh_vertices(&mut self, vertices: Vec<f32>) -> Result<usize, JsValue> {
        self.session.load_mesh_vertices(vertices).map_err(js_error)
    }

    /// Decode frame series bytes. Returns frames per point.
    #[wasm_bindgen(js_name = loadFrames)]
    pub fn load_frames(&mut self, bytes: &[u8]) -> Result<usize, JsValue> {
        self.session.load_frames(bytes).map_err(js_error)
    }

    /// Await a promise of an `ArrayBuffer` (e.g. `file.arrayBuffer()`), then
    /// decode it as geometry.
    #[wasm_bindgen(js_name = loadGeometryAsync)]
    pub async fn load_geometry_async(&mut self, buffer: Promise) -> Result<usize, JsValue> {
        let bytes = resolve_bytes(buffer).await?;
        self.load_geometry(&bytes)
    }

    /// Await a promise of an `ArrayBuffer`, then decode it as a frame series.
    #[wasm_bindgen(js_name = loadFramesAsync)]
    pub async fn load_frames_async(&mut self, buffer: Promise) -> Result<usize, JsValue> {
        let bytes = resolve_bytes(buffer).await?;
        self.load_frames(&bytes)
    }

    /// Number of points in the current geometry.
    #[wasm_bindgen(js_name = pointCount)]
    pub fn point_count(&self) -> usize {
        self.session.geometry().map_or(0, |g| g.point_count())
    }

    /// Frames per point of the current dataset (0 when none is loaded).
    #[wasm_bindgen(js_name = framesPerPoint)]
    pub fn frames_per_point(&self) -> usize {
        self.session.dataset().map_or(0, |d| d.frames_per_point())
    }

    /// Flat x,y,z coordinate buffer.
    #[wasm_bindgen]
    pub fn positions(&self) -> Vec<f32> {
        self.session
            .geometry()
            .map(|g| g.as_slice().to_vec())
            .unwrap_or_default()
    }

    /// One statistic buffer by name (`mean`, `min`, `max`, `range`, `std_dev`).
    #[wasm_bindgen]
    pub fn statistic(&self, name: &str) -> Result<Vec<f32>, JsValue> {
        let statistic: Statistic = name.parse().map_err(js_error)?;
        let dataset = self
            .session
            .dataset()
            .ok_or_else(|| JsValue::from_str("No frame series loaded"))?;
        Ok(dataset.statistic(statistic).to_vec())
    }

    /// Readings of every point at one frame.
    #[wasm_bindgen]
    pub fn frame(&self, index: usize) -> Vec<f32> {
        self.session
            .dataset()
            .and_then(|d| d.frame(index))
            .unwrap_or_default()
    }

    /// Switch to a named gradient scheme.
    #[wasm_bindgen(js_name = setScheme)]
    pub fn set_scheme(&mut self, name: &str) -> Result<(), JsValue> {
        let scheme: GradientScheme = name.parse().map_err(js_error)?;
        self.session.set_gradient(scheme.gradient());
        Ok(())
    }

    /// Switch to a custom gradient from three hex colors.
    #[wasm_bindgen(js_name = setGradient)]
    pub fn set_gradient(&mut self, low: &str, mid: &str, high: &str) -> Result<(), JsValue> {
        let gradient = Gradient::from_hex([low, mid, high]).map_err(js_error)?;
        self.session.set_gradient(gradient);
        Ok(())
    }

    /// Shade a frame, returning `{ colors, alphas }`.
    #[wasm_bindgen(js_name = shadeFrame)]
    pub fn shade_frame(
        &self,
        frame: usize,
        min: Option<f32>,
        max: Option<f32>,
    ) -> Result<JsValue, JsValue> {
        let shading = self
            .session
            .shade_frame(frame, window(min, max))
            .map_err(js_error)?;
        serde_wasm_bindgen::to_value(&shading)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Shade a statistic buffer, returning `{ colors, alphas }`.
    #[wasm_bindgen(js_name = shadeStatistic)]
    pub fn shade_statistic(
        &self,
        name: &str,
        min: Option<f32>,
        max: Option<f32>,
    ) -> Result<JsValue, JsValue> {
        let statistic: Statistic = name.parse().map_err(js_error)?;
        let shading = self
            .session
            .shade_statistic(statistic, window(min, max))
            .map_err(js_error)?;
        serde_wasm_bindgen::to_value(&shading)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Dataset summary as a JS object.
    #[wasm_bindgen]
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        let dataset = self
            .session
            .dataset()
            .ok_or_else(|| JsValue::from_str("No frame series loaded"))?;
        serde_wasm_bindgen::to_value(&dataset.summary())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Serialize the report text on demand.
    #[wasm_bindgen(js_name = exportReport)]
    pub fn export_report(&self) -> Result<String, JsValue> {
        let bytes = self.session.export().map_err(js_error)?;
        String::from_utf8(bytes).map_err(js_error)
    }
}

fn window(min: Option<f32>, max: Option<f32>) -> Option<(f32, f32)> {
    min.zip(max)
}

async fn resolve_bytes(buffer: Promise) -> Result<Vec<u8>, JsValue> {
    let value = JsFuture::from(buffer).await?;
    Ok(Uint8Array::new(&value).to_vec())
}
