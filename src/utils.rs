use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn format_risk_index(risk: f64) -> String {
    format!("{:.4}", risk)
}

#[wasm_bindgen]
pub fn format_degrees(degrees: f64) -> String {
    format!("{:.6}", degrees)
}

#[wasm_bindgen]
pub fn format_pixel(pixel: f64) -> String {
    format!("{:.2}", pixel)
}

/// Popup text shown on the selection marker
#[wasm_bindgen]
pub fn format_marker_popup(latitude: f64, longitude: f64) -> String {
    format!(
        "Clicked at:\nLat: {}, \nLng: {}",
        format_degrees(latitude),
        format_degrees(longitude)
    )
}
