use geo::{coord, Intersects, Rect};
use serde::{Deserialize, Serialize};

use crate::error::RiskMapError;
use crate::projection::GeoCoordinate;

/// Geographic rectangle inside which map clicks are accepted.
///
/// Edges are inclusive, matching how the map widget tests its own bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl SelectionBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Result<Self, RiskMapError> {
        let bounds = SelectionBounds {
            south,
            west,
            north,
            east,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), RiskMapError> {
        let corners = [self.south, self.west, self.north, self.east];
        if corners.iter().any(|v| !v.is_finite()) {
            return Err(RiskMapError::Config(
                "selection bounds must be finite".to_string(),
            ));
        }

        if self.south > self.north || self.west > self.east {
            return Err(RiskMapError::Config(format!(
                "selection bounds are inverted: south-west ({}, {}), north-east ({}, {})",
                self.south, self.west, self.north, self.east
            )));
        }

        if self.south < -90.0 || self.north > 90.0 || self.west < -180.0 || self.east > 180.0 {
            return Err(RiskMapError::Config(
                "selection bounds must lie within [-90, 90] x [-180, 180]".to_string(),
            ));
        }

        Ok(())
    }

    /// x = longitude, y = latitude
    pub fn rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.north },
        )
    }

    pub fn contains(&self, coordinate: &GeoCoordinate) -> bool {
        self.rect().intersects(&geo::Coord::from(*coordinate))
    }

    /// Raw latitude/longitude check; non-finite input is never contained
    pub fn contains_lat_lon(&self, latitude: f64, longitude: f64) -> bool {
        if !latitude.is_finite() || !longitude.is_finite() {
            return false;
        }
        self.rect().intersects(&coord! { x: longitude, y: latitude })
    }

    /// `[south, west, north, east]`, the order map widgets take for fit-to-bounds
    pub fn corners(&self) -> Vec<f64> {
        vec![self.south, self.west, self.north, self.east]
    }

    /// `(latitude, longitude)` of the rectangle's centre
    pub fn center(&self) -> (f64, f64) {
        let center = self.rect().center();
        (center.y, center.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_bounds;

    #[test]
    fn test_contains_interior_and_edges() {
        let bounds = default_bounds();
        assert!(bounds.contains_lat_lon(42.46106, 5.199101327));
        assert!(bounds.contains_lat_lon(bounds.south, bounds.west));
        assert!(bounds.contains_lat_lon(bounds.north, bounds.east));
        assert!(bounds.contains_lat_lon(0.0, 0.0));
    }

    #[test]
    fn test_rejects_outside_points() {
        let bounds = default_bounds();
        assert!(!bounds.contains_lat_lon(-0.0001, 0.0));
        assert!(!bounds.contains_lat_lon(85.0, 0.0));
        assert!(!bounds.contains_lat_lon(40.0, -100.0));
        assert!(!bounds.contains_lat_lon(40.0, 120.0));
        assert!(!bounds.contains_lat_lon(f64::NAN, 0.0));
    }

    #[test]
    fn test_contains_coordinate() {
        let bounds = default_bounds();
        let inside = GeoCoordinate::new(10.0, 10.0).unwrap();
        let outside = GeoCoordinate::new(-10.0, 10.0).unwrap();
        assert!(bounds.contains(&inside));
        assert!(!bounds.contains(&outside));
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(SelectionBounds::new(10.0, 0.0, 5.0, 20.0).is_err());
        assert!(SelectionBounds::new(0.0, 20.0, 5.0, 10.0).is_err());
        assert!(SelectionBounds::new(0.0, 0.0, 95.0, 10.0).is_err());
        assert!(SelectionBounds::new(f64::NAN, 0.0, 5.0, 10.0).is_err());
    }

    #[test]
    fn test_corners_and_center() {
        let bounds = SelectionBounds::new(0.0, -10.0, 20.0, 30.0).unwrap();
        assert_eq!(bounds.corners(), vec![0.0, -10.0, 20.0, 30.0]);
        let (lat, lon) = bounds.center();
        assert!((lat - 10.0).abs() < 1e-12);
        assert!((lon - 10.0).abs() < 1e-12);
    }
}
