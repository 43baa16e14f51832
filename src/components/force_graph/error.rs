use thiserror::Error;

/// Structural problems with an incoming graph. Malformed entries inside
/// otherwise valid arrays are not errors; the sanitizer drops them.
#[derive(Debug, Error)]
pub enum GraphError {
	#[error("graph data must be a JSON object")]
	NotAnObject,
	#[error("graph data is missing the `{0}` array")]
	MissingArray(&'static str),
	#[error("invalid graph JSON: {0}")]
	Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
	#[error("no browser document available")]
	NoDocument,
	#[error("failed to decode scene image: {0}")]
	Decode(String),
	#[error("canvas 2d context unavailable")]
	NoContext,
	#[error("browser call failed: {0}")]
	Js(String),
}

impl From<wasm_bindgen::JsValue> for ExportError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		ExportError::Js(format!("{value:?}"))
	}
}
