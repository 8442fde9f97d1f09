use thiserror::Error;

/// Failures while bringing the backdrop up.
///
/// A page without the canvas is not one of them: initialization just returns
/// `Ok(None)` in that case.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("rendering context unavailable: {0}")]
    Unsupported(String),
    #[error("shader compilation failed: {0}")]
    Shader(String),
    #[error("program link failed: {0}")]
    Link(String),
    #[error("platform call failed: {0}")]
    Platform(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for SceneError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        SceneError::Platform(format!("{value:?}"))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<SceneError> for wasm_bindgen::JsValue {
    fn from(err: SceneError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
