use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::ViewerConfig;
use crate::error::RiskMapError;
use crate::projection::{project, GeoCoordinate, MapGeometry, PixelCoordinate};
use crate::raster::RiskRaster;
use crate::utils::{format_degrees, format_marker_popup, format_pixel, format_risk_index};
use crate::{console_log, console_warn};

/// Message shown in place of the overlay when the raster cannot be loaded
pub const LOAD_FAILURE_MESSAGE: &str =
    "Failed to load the image. Please check if the image URL is correct and accessible.";

/// Readiness of the interactive map. Clicks are only accepted once Ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    Uninitialized,
    Ready,
}

/// Lifecycle of the risk raster. `LoadFailed` is terminal for the session.
pub enum ImageState {
    NotRequested,
    Loading,
    Loaded(RiskRaster),
    LoadFailed(String),
}

impl ImageState {
    fn status(&self) -> &'static str {
        match self {
            ImageState::NotRequested => "not_requested",
            ImageState::Loading => "loading",
            ImageState::Loaded(_) => "loaded",
            ImageState::LoadFailed(_) => "load_failed",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Selection {
    coordinate: GeoCoordinate,
    pixel: PixelCoordinate,
    risk: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SelectionReport {
    pub latitude: f64,
    pub longitude: f64,
    pub x: f64,
    pub y: f64,
    pub risk_index: Option<f64>,
    pub formatted: FormattedSelection,
}

#[derive(Debug, Serialize)]
pub struct FormattedSelection {
    pub latitude: String,
    pub longitude: String,
    pub x: String,
    pub y: String,
    pub risk_index: Option<String>,
}

/// View-model for one page session: map readiness, raster loading, and the
/// latest accepted click with its derived pixel and risk index.
#[wasm_bindgen]
pub struct RiskSession {
    config: ViewerConfig,
    map: MapState,
    image: ImageState,
    selection: Option<Selection>,
}

#[wasm_bindgen]
impl RiskSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> RiskSession {
        Self::with_config(ViewerConfig::default())
    }

    /// Create a session from a JSON config override
    pub fn from_config_json(json: &str) -> Result<RiskSession, RiskMapError> {
        Ok(Self::with_config(ViewerConfig::from_json(json)?))
    }

    pub fn config_json(&self) -> Result<String, RiskMapError> {
        self.config.to_json()
    }

    // Map capability

    pub fn mark_map_ready(&mut self) {
        if self.map == MapState::Ready {
            return;
        }
        self.map = MapState::Ready;
        console_log!("Map ready, accepting clicks");
    }

    pub fn is_map_ready(&self) -> bool {
        self.map == MapState::Ready
    }

    /// `[south, west, north, east]` of the selectable rectangle
    pub fn fit_bounds(&self) -> Vec<f64> {
        self.config.bounds.corners()
    }

    /// `[lat, lon]` the map opens on
    pub fn map_center(&self) -> Vec<f64> {
        vec![self.config.center_lat, self.config.center_lon]
    }

    pub fn initial_zoom(&self) -> u8 {
        self.config.initial_zoom
    }

    pub fn scroll_wheel_zoom(&self) -> bool {
        self.config.scroll_wheel_zoom
    }

    pub fn tile_url(&self) -> String {
        self.config.tile_url.clone()
    }

    pub fn tile_attribution(&self) -> String {
        self.config.tile_attribution.clone()
    }

    pub fn raster_url(&self) -> String {
        self.config.raster_url.clone()
    }

    pub fn geometry(&self) -> MapGeometry {
        self.config.geometry
    }

    // Raster lifecycle

    pub fn begin_image_load(&mut self) -> Result<(), RiskMapError> {
        match self.image {
            ImageState::NotRequested => {
                self.image = ImageState::Loading;
                console_log!("Loading risk raster from {}", self.config.raster_url);
                Ok(())
            }
            ImageState::Loading | ImageState::Loaded(_) => Ok(()),
            ImageState::LoadFailed(ref reason) => Err(RiskMapError::LoadFailed(reason.clone())),
        }
    }

    /// Decode fetched raster bytes and make them available for sampling
    pub fn complete_image_load(&mut self, file_data: &[u8]) -> Result<(), RiskMapError> {
        match &self.image {
            ImageState::Loaded(_) => {
                console_warn!("Risk raster already loaded; ignoring second load");
                return Ok(());
            }
            ImageState::LoadFailed(reason) => {
                return Err(RiskMapError::LoadFailed(reason.clone()));
            }
            ImageState::NotRequested | ImageState::Loading => {}
        }

        match RiskRaster::from_bytes(file_data) {
            Ok(raster) => {
                self.load_raster(raster);
                Ok(())
            }
            Err(err) => {
                self.fail_image_load(err.to_string());
                Err(err)
            }
        }
    }

    /// Install an already decoded raster
    pub fn load_raster(&mut self, raster: RiskRaster) {
        if let ImageState::Loaded(_) = self.image {
            console_warn!("Risk raster already loaded; ignoring second load");
            return;
        }

        if !raster.matches_geometry(&self.config.geometry) {
            console_warn!(
                "Risk raster is {}x{} but projection expects {}x{}",
                raster.width(),
                raster.height(),
                self.config.geometry.pixel_width,
                self.config.geometry.pixel_height
            );
        }

        console_log!("Risk raster loaded successfully");
        self.image = ImageState::Loaded(raster);

        if let Some(mut selection) = self.selection {
            selection.risk = self.risk_at(&selection.pixel);
            self.selection = Some(selection);
        }
    }

    pub fn fail_image_load(&mut self, reason: String) {
        if let ImageState::Loaded(_) = self.image {
            console_warn!("Ignoring load failure after raster loaded: {}", reason);
            return;
        }
        console_warn!("Error loading risk raster: {}", reason);
        self.image = ImageState::LoadFailed(reason);
    }

    pub fn image_status(&self) -> String {
        self.image.status().to_string()
    }

    pub fn is_image_loaded(&self) -> bool {
        matches!(self.image, ImageState::Loaded(_))
    }

    /// User-facing message once loading has failed
    pub fn image_error(&self) -> Option<String> {
        match self.image {
            ImageState::LoadFailed(_) => Some(LOAD_FAILURE_MESSAGE.to_string()),
            _ => None,
        }
    }

    /// Underlying reason for a load failure, for diagnostics
    pub fn image_error_detail(&self) -> Option<String> {
        match &self.image {
            ImageState::LoadFailed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    // Selection

    /// Handle a map click. Returns whether the click was accepted.
    ///
    /// Clicks before the map is ready or outside the selection bounds are
    /// ignored and leave the current selection untouched. An accepted click
    /// replaces the selection.
    pub fn select(&mut self, latitude: f64, longitude: f64) -> Result<bool, RiskMapError> {
        if self.map != MapState::Ready {
            console_warn!("Map not ready; ignoring click at ({}, {})", latitude, longitude);
            return Ok(false);
        }

        // Unwrapped longitudes past the antimeridian and non-finite input land here too
        if !self.config.bounds.contains_lat_lon(latitude, longitude) {
            console_log!("Click at ({}, {}) is outside the selectable area", latitude, longitude);
            return Ok(false);
        }

        let coordinate = GeoCoordinate::new(latitude, longitude)?;

        let pixel = project(&coordinate, &self.config.geometry)?;
        let risk = self.risk_at(&pixel);

        self.selection = Some(Selection {
            coordinate,
            pixel,
            risk,
        });

        Ok(true)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    pub fn selected_coordinate(&self) -> Option<GeoCoordinate> {
        self.selection.map(|s| s.coordinate)
    }

    pub fn selected_latitude(&self) -> Option<f64> {
        self.selection.map(|s| s.coordinate.latitude())
    }

    pub fn selected_longitude(&self) -> Option<f64> {
        self.selection.map(|s| s.coordinate.longitude())
    }

    pub fn pixel(&self) -> Option<PixelCoordinate> {
        self.selection.map(|s| s.pixel)
    }

    pub fn pixel_x(&self) -> Option<f64> {
        self.selection.map(|s| s.pixel.x())
    }

    pub fn pixel_y(&self) -> Option<f64> {
        self.selection.map(|s| s.pixel.y())
    }

    pub fn risk_index(&self) -> Option<f64> {
        self.selection.and_then(|s| s.risk)
    }

    /// Scroll offset `[left, top]` that centres a viewport of the given size
    /// on the marker. Empty without a selection.
    pub fn scroll_target(&self, viewport_width: f64, viewport_height: f64) -> Vec<f64> {
        match self.selection {
            Some(s) => vec![
                s.pixel.x() - viewport_width / 2.0,
                s.pixel.y() - viewport_height / 2.0,
            ],
            None => Vec::new(),
        }
    }

    pub fn marker_popup(&self) -> Option<String> {
        self.selection
            .map(|s| format_marker_popup(s.coordinate.latitude(), s.coordinate.longitude()))
    }

    pub fn report_json(&self) -> Result<Option<String>, RiskMapError> {
        match self.report() {
            Some(report) => Ok(Some(serde_json::to_string(&report)?)),
            None => Ok(None),
        }
    }
}

impl RiskSession {
    pub fn with_config(config: ViewerConfig) -> RiskSession {
        RiskSession {
            config,
            map: MapState::Uninitialized,
            image: ImageState::NotRequested,
            selection: None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn map_state(&self) -> MapState {
        self.map
    }

    pub fn image_state(&self) -> &ImageState {
        &self.image
    }

    pub fn report(&self) -> Option<SelectionReport> {
        let s = self.selection?;
        let (latitude, longitude) = (s.coordinate.latitude(), s.coordinate.longitude());

        Some(SelectionReport {
            latitude,
            longitude,
            x: s.pixel.x(),
            y: s.pixel.y(),
            risk_index: s.risk,
            formatted: FormattedSelection {
                latitude: format_degrees(latitude),
                longitude: format_degrees(longitude),
                x: format_pixel(s.pixel.x()),
                y: format_pixel(s.pixel.y()),
                risk_index: s.risk.map(format_risk_index),
            },
        })
    }

    fn risk_at(&self, pixel: &PixelCoordinate) -> Option<f64> {
        let ImageState::Loaded(raster) = &self.image else {
            return None;
        };

        match raster.sample_pixel(pixel) {
            Ok(risk) => Some(risk),
            Err(err) => {
                console_warn!("No risk index available: {}", err);
                None
            }
        }
    }
}

impl Default for RiskSession {
    fn default() -> Self {
        Self::new()
    }
}
