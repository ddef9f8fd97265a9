use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong between a map click and a risk index.
///
/// None of these are fatal to a session: each one maps to a user-visible
/// state (no pixel, no risk index, or a load failure message).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskMapError {
    /// Coordinate outside the range the projection is defined on.
    #[error("coordinate ({latitude}, {longitude}) is outside the projectable domain")]
    OutOfDomain { latitude: f64, longitude: f64 },

    #[error("invalid map geometry: {0}")]
    InvalidGeometry(String),

    /// Pixel coordinate outside `[0, width) x [0, height)` after rounding.
    #[error("pixel ({x:.2}, {y:.2}) lies outside the {width}x{height} raster")]
    OutOfBounds {
        x: f64,
        y: f64,
        width: usize,
        height: usize,
    },

    #[error("failed to load risk raster: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to serialize report: {0}")]
    Serialize(String),
}

impl From<RiskMapError> for JsValue {
    fn from(err: RiskMapError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl From<serde_json::Error> for RiskMapError {
    fn from(err: serde_json::Error) -> Self {
        RiskMapError::Serialize(err.to_string())
    }
}
