use std::f64::consts::{FRAC_PI_4, PI};

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::RiskMapError;

/// Fixed geometry of the risk raster: its pixel size and the longitude span
/// it covers horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[wasm_bindgen]
pub struct MapGeometry {
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Longitude at the left edge of the raster
    pub base_longitude: f64,
    /// Longitude at the right edge of the raster
    pub end_longitude: f64,
}

#[wasm_bindgen]
impl MapGeometry {
    #[wasm_bindgen(constructor)]
    pub fn new(
        pixel_width: u32,
        pixel_height: u32,
        base_longitude: f64,
        end_longitude: f64,
    ) -> Result<MapGeometry, RiskMapError> {
        let geometry = MapGeometry {
            pixel_width,
            pixel_height,
            base_longitude,
            end_longitude,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<(), RiskMapError> {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return Err(RiskMapError::InvalidGeometry(format!(
                "pixel dimensions must be positive, got {}x{}",
                self.pixel_width, self.pixel_height
            )));
        }

        if !self.base_longitude.is_finite() || !self.end_longitude.is_finite() {
            return Err(RiskMapError::InvalidGeometry(
                "longitude span must be finite".to_string(),
            ));
        }

        if self.end_longitude <= self.base_longitude {
            return Err(RiskMapError::InvalidGeometry(format!(
                "end longitude {} must be greater than base longitude {}",
                self.end_longitude, self.base_longitude
            )));
        }

        Ok(())
    }

    /// Degrees of longitude covered by one pixel column
    pub fn longitude_factor(&self) -> f64 {
        self.width_degrees() / self.pixel_width as f64
    }

    pub fn width_degrees(&self) -> f64 {
        self.end_longitude - self.base_longitude
    }

    pub fn width_radians(&self) -> f64 {
        self.width_degrees() * PI / 180.0
    }

    /// Whether `(x, y)` rounds to a pixel inside the raster
    pub fn contains_pixel(&self, x: f64, y: f64) -> bool {
        pixel_index(x, self.pixel_width as usize).is_some()
            && pixel_index(y, self.pixel_height as usize).is_some()
    }
}

/// A latitude/longitude pair in degrees. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[wasm_bindgen]
pub struct GeoCoordinate {
    latitude: f64,
    longitude: f64,
}

#[wasm_bindgen]
impl GeoCoordinate {
    #[wasm_bindgen(constructor)]
    pub fn new(latitude: f64, longitude: f64) -> Result<GeoCoordinate, RiskMapError> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !in_range {
            return Err(RiskMapError::OutOfDomain {
                latitude,
                longitude,
            });
        }

        Ok(GeoCoordinate {
            latitude,
            longitude,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[wasm_bindgen(getter)]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl From<GeoCoordinate> for geo::Coord<f64> {
    fn from(coordinate: GeoCoordinate) -> Self {
        geo::coord! { x: coordinate.longitude, y: coordinate.latitude }
    }
}

/// Position on the raster in pixels. Not clamped and not necessarily integral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[wasm_bindgen]
pub struct PixelCoordinate {
    x: f64,
    y: f64,
}

#[wasm_bindgen]
impl PixelCoordinate {
    #[wasm_bindgen(constructor)]
    pub fn new(x: f64, y: f64) -> PixelCoordinate {
        PixelCoordinate { x, y }
    }

    #[wasm_bindgen(getter)]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Nearest integral pixel column
    pub fn column(&self) -> f64 {
        nearest_pixel(self.x)
    }

    /// Nearest integral pixel row
    pub fn row(&self) -> f64 {
        nearest_pixel(self.y)
    }
}

/// Round half up, the way the browser's `Math.round` does.
///
/// `f64::round` rounds half away from zero, which would push -0.5 off the
/// raster where the browser keeps it on pixel 0.
pub fn nearest_pixel(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounded index of `value` if it falls in `[0, len)`
pub(crate) fn pixel_index(value: f64, len: usize) -> Option<usize> {
    let rounded = nearest_pixel(value);
    if rounded.is_finite() && rounded >= 0.0 && rounded < len as f64 {
        Some(rounded as usize)
    } else {
        None
    }
}

/// Project a geographic coordinate onto the raster.
///
/// Longitude maps linearly onto columns, with the base longitude landing on
/// column 1. Latitude uses the Mercator ordinate `ln(tan(pi/4 + lat/2))`,
/// scaled so that one radian of longitude and one Mercator unit cover the
/// same number of pixels, with the equator on row `pixel_height` and north up.
///
/// Southern latitudes are folded onto the row of the matching northern
/// latitude (`y(-lat) == y(lat)`). The risk raster only covers the northern
/// hemisphere and clicks south of the equator never reach the projection.
///
/// # Errors
/// `OutOfDomain` at the poles, where the Mercator ordinate diverges.
pub fn project(
    coordinate: &GeoCoordinate,
    geometry: &MapGeometry,
) -> Result<PixelCoordinate, RiskMapError> {
    let latitude = coordinate.latitude;
    let longitude = coordinate.longitude;

    if latitude.abs() >= 90.0 {
        return Err(RiskMapError::OutOfDomain {
            latitude,
            longitude,
        });
    }

    let x = 1.0 + (longitude - geometry.base_longitude) / geometry.longitude_factor();

    let lat_rad = latitude * PI / 180.0;
    let y_from_equator = (FRAC_PI_4 + lat_rad / 2.0).tan().ln();
    if !y_from_equator.is_finite() {
        return Err(RiskMapError::OutOfDomain {
            latitude,
            longitude,
        });
    }

    let scaled = geometry.pixel_width as f64 * y_from_equator / geometry.width_radians();
    let y = if y_from_equator >= 0.0 {
        geometry.pixel_height as f64 - scaled
    } else {
        geometry.pixel_height as f64 + scaled
    };

    Ok(PixelCoordinate { x, y })
}

/// Validate and project a raw latitude/longitude pair
#[wasm_bindgen]
pub fn project_lat_lon(
    latitude: f64,
    longitude: f64,
    geometry: &MapGeometry,
) -> Result<PixelCoordinate, RiskMapError> {
    geometry.validate()?;
    let coordinate = GeoCoordinate::new(latitude, longitude)?;
    project(&coordinate, geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_geometry;

    fn project_default(lat: f64, lon: f64) -> PixelCoordinate {
        project_lat_lon(lat, lon, &default_geometry()).unwrap()
    }

    #[test]
    fn test_base_longitude_anchors_first_column() {
        let geometry = default_geometry();
        let pixel = project_default(0.0, geometry.base_longitude);
        assert!((pixel.x() - 1.0).abs() < 1e-9);
        // Equator sits on the bottom edge
        assert!((pixel.y() - geometry.pixel_height as f64).abs() < 1e-9);
    }

    #[test]
    fn test_map_center_projection() {
        let pixel = project_default(42.46106, 5.199101327);
        assert!((pixel.x() - 655.0).abs() < 1e-6, "x = {}", pixel.x());
        assert!((pixel.y() - 983.148_144_603).abs() < 1e-6, "y = {}", pixel.y());
        assert_eq!(pixel.column(), 655.0);
        assert_eq!(pixel.row(), 983.0);
    }

    #[test]
    fn test_end_longitude_lands_one_past_last_column() {
        let geometry = default_geometry();
        let pixel = project_default(10.0, geometry.end_longitude);
        assert!((pixel.x() - (geometry.pixel_width as f64 + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_x_strictly_increases_with_longitude() {
        let geometry = default_geometry();
        let mut previous = f64::NEG_INFINITY;
        let mut lon = geometry.base_longitude;
        while lon <= geometry.end_longitude {
            let pixel = project_default(35.0, lon);
            assert!(pixel.x() > previous, "x not increasing at lon {}", lon);
            previous = pixel.x();
            lon += 2.5;
        }
    }

    #[test]
    fn test_northern_latitudes_are_north_up() {
        let geometry = default_geometry();
        let height = geometry.pixel_height as f64;

        let north = project_default(60.0, 0.0);
        let mid = project_default(30.0, 0.0);

        assert!(north.y() < height);
        assert!(mid.y() < height);
        assert!(north.y() < mid.y());
    }

    #[test]
    fn test_southern_latitudes_fold_onto_northern_rows() {
        let geometry = default_geometry();
        let height = geometry.pixel_height as f64;

        for lat in [0.5, 10.0, 45.0, 80.0] {
            let north = project_default(lat, 0.0);
            let south = project_default(-lat, 0.0);
            assert!((north.y() - south.y()).abs() < 1e-9, "lat {}", lat);
            assert!(south.y() < height);
            assert_eq!(north.x(), south.x());
        }

        let south = project_default(-10.0, 0.0);
        assert!((south.y() - 1258.944).abs() < 1e-3, "y = {}", south.y());
    }

    #[test]
    fn test_finite_inside_domain() {
        let geometry = default_geometry();
        for lat in [-89.999, -45.0, -0.001, 0.0, 0.001, 45.0, 84.92212, 89.999] {
            for lon in [geometry.base_longitude, 0.0, geometry.end_longitude] {
                let pixel = project_default(lat, lon);
                assert!(pixel.x().is_finite() && pixel.y().is_finite(), "({}, {})", lat, lon);
            }
        }
    }

    #[test]
    fn test_poles_are_out_of_domain() {
        let geometry = default_geometry();
        for lat in [90.0, -90.0] {
            let result = project_lat_lon(lat, 0.0, &geometry);
            assert!(matches!(result, Err(RiskMapError::OutOfDomain { .. })));
        }
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        assert!(GeoCoordinate::new(91.0, 0.0).is_err());
        assert!(GeoCoordinate::new(0.0, 180.5).is_err());
        assert!(GeoCoordinate::new(f64::NAN, 0.0).is_err());
        assert!(GeoCoordinate::new(0.0, f64::INFINITY).is_err());
        assert!(GeoCoordinate::new(90.0, -180.0).is_ok());
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(MapGeometry::new(0, 10, 0.0, 10.0).is_err());
        assert!(MapGeometry::new(10, 0, 0.0, 10.0).is_err());
        assert!(MapGeometry::new(10, 10, 10.0, 10.0).is_err());
        assert!(MapGeometry::new(10, 10, f64::NAN, 10.0).is_err());
        assert!(MapGeometry::new(10, 10, -5.0, 5.0).is_ok());
    }

    #[test]
    fn test_nearest_pixel_rounds_half_up() {
        assert_eq!(nearest_pixel(2.4), 2.0);
        assert_eq!(nearest_pixel(2.5), 3.0);
        assert_eq!(nearest_pixel(-0.4), 0.0);
        assert_eq!(nearest_pixel(-0.5), 0.0);
        assert_eq!(nearest_pixel(-0.6), -1.0);
    }

    #[test]
    fn test_contains_pixel() {
        let geometry = MapGeometry::new(4, 3, 0.0, 4.0).unwrap();
        assert!(geometry.contains_pixel(0.0, 0.0));
        assert!(geometry.contains_pixel(-0.4, 2.4));
        assert!(!geometry.contains_pixel(3.5, 0.0));
        assert!(!geometry.contains_pixel(0.0, 2.5));
        assert!(!geometry.contains_pixel(f64::NAN, 0.0));
    }
}
