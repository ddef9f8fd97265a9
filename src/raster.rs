use std::io::Cursor;

use image::ImageFormat;
use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::ColorType;
use wasm_bindgen::prelude::*;

use crate::error::RiskMapError;
use crate::projection::{pixel_index, project_lat_lon, MapGeometry, PixelCoordinate};
use crate::security::RasterValidator;
use crate::{console_log, console_warn};

/// Convert an 8-bit intensity to a risk index: darker pixels carry more risk.
pub fn risk_from_intensity(intensity: u8) -> f64 {
    1.0 - f64::from(intensity) / 255.0
}

/// A decoded risk surface.
///
/// Only one 8-bit channel is kept. The source is expected to be grayscale,
/// so channel 0 stands in for all of them; colored sources are accepted
/// but logged, and no color-space conversion is attempted.
#[wasm_bindgen]
pub struct RiskRaster {
    /// Intensities indexed [row, col]
    pixels: Array2<u8>,
}

#[wasm_bindgen]
impl RiskRaster {
    /// Decode a PNG or TIFF raster from file bytes
    #[wasm_bindgen(constructor)]
    pub fn new(file_data: &[u8]) -> Result<RiskRaster, RiskMapError> {
        Self::from_bytes(file_data)
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    /// Raw intensity at an integral pixel, if it exists
    pub fn intensity_at(&self, col: usize, row: usize) -> Option<u8> {
        self.pixels.get((row, col)).copied()
    }

    /// Risk index at the pixel nearest to `(x, y)`.
    ///
    /// # Errors
    /// `OutOfBounds` if the rounded pixel falls outside the raster.
    pub fn sample(&self, x: f64, y: f64) -> Result<f64, RiskMapError> {
        let (height, width) = self.pixels.dim();

        match (pixel_index(x, width), pixel_index(y, height)) {
            (Some(col), Some(row)) => Ok(risk_from_intensity(self.pixels[[row, col]])),
            _ => Err(RiskMapError::OutOfBounds {
                x,
                y,
                width,
                height,
            }),
        }
    }

    pub fn sample_pixel(&self, pixel: &PixelCoordinate) -> Result<f64, RiskMapError> {
        self.sample(pixel.x(), pixel.y())
    }

    /// Project a coordinate with `geometry`, then sample
    pub fn sample_geo(
        &self,
        latitude: f64,
        longitude: f64,
        geometry: &MapGeometry,
    ) -> Result<f64, RiskMapError> {
        let pixel = project_lat_lon(latitude, longitude, geometry)?;
        self.sample_pixel(&pixel)
    }

    /// Whether the decoded size agrees with the geometry used for projection
    pub fn matches_geometry(&self, geometry: &MapGeometry) -> bool {
        self.width() == geometry.pixel_width as usize
            && self.height() == geometry.pixel_height as usize
    }
}

impl RiskRaster {
    pub fn from_bytes(file_data: &[u8]) -> Result<RiskRaster, RiskMapError> {
        RasterValidator::new().validate_raster_data(file_data)?;

        let format = image::guess_format(file_data)
            .map_err(|e| RiskMapError::LoadFailed(format!("unrecognized raster format: {}", e)))?;

        let raster = match format {
            ImageFormat::Tiff => Self::decode_tiff(file_data)?,
            ImageFormat::Png => Self::decode_png(file_data)?,
            other => {
                return Err(RiskMapError::LoadFailed(format!(
                    "unsupported raster format {:?}",
                    other
                )))
            }
        };

        console_log!(
            "Risk raster decoded ({:?}): {}x{}",
            format,
            raster.width(),
            raster.height()
        );

        Ok(raster)
    }

    /// Build a raster from row-major 8-bit intensities
    pub fn from_gray(width: usize, height: usize, data: Vec<u8>) -> Result<RiskRaster, RiskMapError> {
        if width == 0 || height == 0 {
            return Err(RiskMapError::LoadFailed(format!(
                "raster has no pixels: {}x{}",
                width, height
            )));
        }

        let pixels = Array2::from_shape_vec((height, width), data)
            .map_err(|e| RiskMapError::LoadFailed(format!("raster size mismatch: {}", e)))?;

        Ok(RiskRaster { pixels })
    }

    fn decode_png(file_data: &[u8]) -> Result<RiskRaster, RiskMapError> {
        let image = image::load_from_memory_with_format(file_data, ImageFormat::Png)
            .map_err(|e| RiskMapError::LoadFailed(format!("failed to decode PNG: {}", e)))?;

        match image.color() {
            image::ColorType::L8
            | image::ColorType::La8
            | image::ColorType::Rgb8
            | image::ColorType::Rgba8 => {}
            other => {
                return Err(RiskMapError::LoadFailed(format!(
                    "unsupported PNG color type {:?}; an 8-bit grayscale raster is required",
                    other
                )))
            }
        }

        let rgba = image.to_rgba8();
        let (width, height) = (rgba.width() as usize, rgba.height() as usize);
        let intensities = first_channel(rgba.as_raw(), 4);

        Self::from_gray(width, height, intensities)
    }

    fn decode_tiff(file_data: &[u8]) -> Result<RiskRaster, RiskMapError> {
        let mut decoder = Decoder::new(Cursor::new(file_data))
            .map_err(|e| RiskMapError::LoadFailed(format!("failed to read TIFF: {}", e)))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| RiskMapError::LoadFailed(format!("failed to get image dimensions: {}", e)))?;

        let channels = match decoder
            .colortype()
            .map_err(|e| RiskMapError::LoadFailed(format!("failed to get color type: {}", e)))?
        {
            ColorType::Gray(8) => 1,
            ColorType::GrayA(8) => 2,
            ColorType::RGB(8) => 3,
            ColorType::RGBA(8) => 4,
            other => {
                return Err(RiskMapError::LoadFailed(format!(
                    "unsupported TIFF color type {:?}; an 8-bit grayscale raster is required",
                    other
                )))
            }
        };

        let values = match decoder
            .read_image()
            .map_err(|e| RiskMapError::LoadFailed(format!("failed to read image: {}", e)))?
        {
            DecodingResult::U8(values) => values,
            _ => {
                return Err(RiskMapError::LoadFailed(
                    "TIFF sample format is not 8-bit unsigned".to_string(),
                ))
            }
        };

        Self::from_gray(
            width as usize,
            height as usize,
            first_channel(&values, channels),
        )
    }
}

/// Keep channel 0 of interleaved 8-bit samples, warning if any pixel is not grey.
///
/// With 2 or 4 channels the last one is alpha. Fully transparent pixels read
/// as 0, the value a transparent canvas reports for them.
fn first_channel(samples: &[u8], channels: usize) -> Vec<u8> {
    if channels == 1 {
        return samples.to_vec();
    }

    let has_alpha = channels == 2 || channels == 4;
    let color_channels = if has_alpha { channels - 1 } else { channels };
    let mut colored = 0usize;
    let intensities = samples
        .chunks_exact(channels)
        .map(|pixel| {
            if has_alpha && pixel[channels - 1] == 0 {
                return 0;
            }
            if pixel[..color_channels].iter().any(|&c| c != pixel[0]) {
                colored += 1;
            }
            pixel[0]
        })
        .collect();

    if colored > 0 {
        console_warn!(
            "Risk raster has {} non-grey pixels; sampling channel 0 only",
            colored
        );
    }

    intensities
}
