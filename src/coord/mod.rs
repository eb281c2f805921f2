use crate::error::HeatmapError;
use geo_types::{Coord, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trait for types that can provide a latitude/longitude in degrees.
///
/// Implemented for [`LatLng`], `geo_types::Coord<f64>` and
/// `geo_types::Point<f64>` (where `x` is longitude and `y` latitude).
/// This allows functions to accept either type.
pub trait Coordinate {
    /// Returns the latitude in degrees.
    fn lat(&self) -> f64;
    /// Returns the longitude in degrees.
    fn lng(&self) -> f64;

    fn to_lat_lng(&self) -> LatLng {
        LatLng::new(self.lat(), self.lng())
    }
}

/// A point on the sphere, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns true when both components are finite and within the
    /// latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Formats the point the way the distance-matrix service expects it.
    pub fn to_request_string(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }
}

impl Coordinate for LatLng {
    fn lat(&self) -> f64 {
        self.lat
    }
    fn lng(&self) -> f64 {
        self.lng
    }
}

impl Coordinate for Coord<f64> {
    fn lat(&self) -> f64 {
        self.y
    }
    fn lng(&self) -> f64 {
        self.x
    }
}

impl Coordinate for Point<f64> {
    fn lat(&self) -> f64 {
        self.y()
    }
    fn lng(&self) -> f64 {
        self.x()
    }
}

impl From<LatLng> for Coord<f64> {
    fn from(ll: LatLng) -> Self {
        Coord {
            x: ll.lng,
            y: ll.lat,
        }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Parses `"lat,lng"` (whitespace around either part is ignored).
impl FromStr for LatLng {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| HeatmapError::InvalidCoordinate(format!("{s:?} is not \"lat,lng\"")))?;

        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|e| HeatmapError::InvalidCoordinate(format!("invalid lat in {s:?}: {e}")))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|e| HeatmapError::InvalidCoordinate(format!("invalid lng in {s:?}: {e}")))?;

        let ll = LatLng::new(lat, lng);
        if !ll.is_valid() {
            return Err(HeatmapError::InvalidCoordinate(format!(
                "{s:?} is out of range"
            )));
        }
        Ok(ll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::point;

    #[test]
    fn test_parse_lat_lng() -> Result<(), HeatmapError> {
        let ll: LatLng = "55.75, 37.45".parse()?;
        assert_eq!(ll, LatLng::new(55.75, 37.45));

        let ll: LatLng = "-33.8688,151.2093".parse()?;
        assert_eq!(ll, LatLng::new(-33.8688, 151.2093));
        Ok(())
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "55.75".parse::<LatLng>(),
            Err(HeatmapError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            "north,east".parse::<LatLng>(),
            Err(HeatmapError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            "95.0,10.0".parse::<LatLng>(),
            Err(HeatmapError::InvalidCoordinate(_))
        ));
        assert!("NaN,1.0".parse::<LatLng>().is_err());
    }

    #[test]
    fn test_request_string_has_six_decimals() {
        let ll = LatLng::new(55.7, 37.123456789);
        assert_eq!(ll.to_request_string(), "55.700000,37.123457");
    }

    #[test]
    fn test_coordinate_trait_point() {
        let pt = point! { x: 37.45, y: 55.75 };
        assert_eq!(pt.lat(), 55.75);
        assert_eq!(pt.lng(), 37.45);
        assert_eq!(pt.to_lat_lng(), LatLng::new(55.75, 37.45));
    }

    #[test]
    fn test_into_geo_coord() {
        let c: Coord<f64> = LatLng::new(1.0, 2.0).into();
        assert_eq!(c.x, 2.0);
        assert_eq!(c.y, 1.0);
    }
}
