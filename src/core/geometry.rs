use crate::coord::{Coordinate, LatLng};
use crate::core::lattice::{BoundingRectangle, StepAngle};
use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// Opposite corners of a sample cell: `a` is north-west, `c` south-east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBounds {
    pub a: LatLng,
    pub c: LatLng,
}

impl CellBounds {
    /// Cell centered on `center`, half a step wide in each direction.
    pub fn around<C: Coordinate>(center: &C, step: StepAngle) -> Self {
        let (half_lat, half_lng) = (step.lat / 2.0, step.lng / 2.0);
        Self {
            a: LatLng::new(center.lat() + half_lat, center.lng() - half_lng),
            c: LatLng::new(center.lat() - half_lat, center.lng() + half_lng),
        }
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        create_rectangle(&self.a, &self.c)
    }
}

impl From<&BoundingRectangle> for CellBounds {
    fn from(rect: &BoundingRectangle) -> Self {
        Self {
            a: LatLng::new(rect.end.lat, rect.start.lng),
            c: LatLng::new(rect.start.lat, rect.end.lng),
        }
    }
}

/// Builds the closed ring `a, (a.lat, c.lng), c, (c.lat, a.lng)`.
pub fn create_rectangle<C: Coordinate>(a: &C, c: &C) -> Polygon<f64> {
    let coords = vec![
        Coord { x: a.lng(), y: a.lat() },
        Coord { x: c.lng(), y: a.lat() },
        Coord { x: c.lng(), y: c.lat() },
        Coord { x: a.lng(), y: c.lat() },
        Coord { x: a.lng(), y: a.lat() },
    ];

    Polygon::new(LineString::from(coords), vec![])
}
