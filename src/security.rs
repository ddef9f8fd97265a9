use wasm_bindgen::prelude::*;

use crate::error::RiskMapError;

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const TIFF_LE_SIGNATURE: &[u8] = b"II*\0";
const TIFF_BE_SIGNATURE: &[u8] = b"MM\0*";

// 50MB limit
const MAX_RASTER_BYTES: usize = 50_000_000;

#[wasm_bindgen]
pub struct RasterValidator;

#[wasm_bindgen]
impl RasterValidator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> RasterValidator {
        RasterValidator
    }

    /// Reject byte buffers that cannot be a PNG or TIFF raster before
    /// handing them to a decoder
    pub fn validate_raster_data(&self, data: &[u8]) -> Result<(), RiskMapError> {
        if data.len() < PNG_SIGNATURE.len() {
            return Err(RiskMapError::LoadFailed(
                "invalid raster: too small".to_string(),
            ));
        }

        if data.len() > MAX_RASTER_BYTES {
            return Err(RiskMapError::LoadFailed(format!(
                "raster too large: {} bytes (limit {})",
                data.len(),
                MAX_RASTER_BYTES
            )));
        }

        let known = data.starts_with(PNG_SIGNATURE)
            || data.starts_with(TIFF_LE_SIGNATURE)
            || data.starts_with(TIFF_BE_SIGNATURE);
        if !known {
            return Err(RiskMapError::LoadFailed(
                "invalid raster: expected a PNG or TIFF signature".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for RasterValidator {
    fn default() -> Self {
        Self::new()
    }
}
