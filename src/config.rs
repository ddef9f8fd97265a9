use serde::{Deserialize, Serialize};

use crate::bounds::SelectionBounds;
use crate::error::RiskMapError;
use crate::projection::MapGeometry;

// Risk raster geometry
pub const RASTER_WIDTH: u32 = 1308;
pub const RASTER_HEIGHT: u32 = 1334;
pub const BASE_LONGITUDE: f64 = -82.381725616;
pub const END_LONGITUDE: f64 = 92.779928270;

pub const RISK_RASTER_URL: &str = "https://ik.imagekit.io/w3joxx5pvz/WhaleOccurrence.png";

// Clicks are accepted between the equator and the raster's northern edge
pub const SELECTION_SOUTH: f64 = 0.0;
pub const SELECTION_NORTH: f64 = 84.92212;

pub const MAP_CENTER_LAT: f64 = 42.46106;
pub const MAP_CENTER_LON: f64 = 5.199101327;
pub const MAP_INITIAL_ZOOM: u8 = 3;

pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

pub fn default_geometry() -> MapGeometry {
    MapGeometry {
        pixel_width: RASTER_WIDTH,
        pixel_height: RASTER_HEIGHT,
        base_longitude: BASE_LONGITUDE,
        end_longitude: END_LONGITUDE,
    }
}

pub fn default_bounds() -> SelectionBounds {
    SelectionBounds {
        south: SELECTION_SOUTH,
        west: BASE_LONGITUDE,
        north: SELECTION_NORTH,
        east: END_LONGITUDE,
    }
}

/// Everything a viewer session needs to know up front.
///
/// Any field left out of a JSON override keeps its built-in default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub geometry: MapGeometry,
    pub bounds: SelectionBounds,
    pub raster_url: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub initial_zoom: u8,
    pub scroll_wheel_zoom: bool,
    pub tile_url: String,
    pub tile_attribution: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            geometry: default_geometry(),
            bounds: default_bounds(),
            raster_url: RISK_RASTER_URL.to_string(),
            center_lat: MAP_CENTER_LAT,
            center_lon: MAP_CENTER_LON,
            initial_zoom: MAP_INITIAL_ZOOM,
            scroll_wheel_zoom: false,
            tile_url: TILE_URL.to_string(),
            tile_attribution: TILE_ATTRIBUTION.to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, RiskMapError> {
        let config: ViewerConfig =
            serde_json::from_str(json).map_err(|e| RiskMapError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, RiskMapError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), RiskMapError> {
        self.geometry.validate()?;
        self.bounds.validate()?;

        if self.raster_url.trim().is_empty() {
            return Err(RiskMapError::Config("raster URL is empty".to_string()));
        }

        let center_ok = self.center_lat.is_finite()
            && self.center_lon.is_finite()
            && (-90.0..=90.0).contains(&self.center_lat)
            && (-180.0..=180.0).contains(&self.center_lon);
        if !center_ok {
            return Err(RiskMapError::Config(format!(
                "map center ({}, {}) is not a valid coordinate",
                self.center_lat, self.center_lon
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.geometry.pixel_width, 1308);
        assert_eq!(config.geometry.pixel_height, 1334);
        assert_eq!(config.bounds.west, config.geometry.base_longitude);
        assert_eq!(config.bounds.east, config.geometry.end_longitude);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ViewerConfig::from_json(r#"{"initial_zoom": 5, "scroll_wheel_zoom": true}"#)
            .unwrap();
        assert_eq!(config.initial_zoom, 5);
        assert!(config.scroll_wheel_zoom);
        assert_eq!(config.raster_url, RISK_RASTER_URL);
        assert_eq!(config.geometry, default_geometry());
    }

    #[test]
    fn test_serialized_defaults_parse_back() {
        let json = ViewerConfig::default().to_json().unwrap();
        assert!(json.contains("\"raster_url\""));
        let parsed = ViewerConfig::from_json(&json).unwrap();
        assert_eq!(parsed.geometry.pixel_width, RASTER_WIDTH);
        assert_eq!(parsed.tile_url, TILE_URL);
        assert!((parsed.center_lat - MAP_CENTER_LAT).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_invalid_overrides() {
        let bad_geometry = r#"{"geometry": {"pixel_width": 0, "pixel_height": 10,
            "base_longitude": 0.0, "end_longitude": 1.0}}"#;
        assert!(matches!(
            ViewerConfig::from_json(bad_geometry),
            Err(RiskMapError::InvalidGeometry(_))
        ));

        let bad_bounds = r#"{"bounds": {"south": 10.0, "west": 0.0, "north": 5.0, "east": 1.0}}"#;
        assert!(matches!(
            ViewerConfig::from_json(bad_bounds),
            Err(RiskMapError::Config(_))
        ));

        assert!(ViewerConfig::from_json(r#"{"raster_url": " "}"#).is_err());
        assert!(ViewerConfig::from_json(r#"{"center_lat": 120.0}"#).is_err());
        assert!(ViewerConfig::from_json("not json").is_err());
    }
}
