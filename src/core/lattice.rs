use crate::coord::{Coordinate, LatLng};
use crate::core::constants::{EARTH_RADIUS, MAX_LATTICE_POINTS};
use crate::error::HeatmapError;
use serde::{Deserialize, Serialize};

/// Angular lattice step in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepAngle {
    pub lat: f64,
    pub lng: f64,
}

impl StepAngle {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Converts a ground distance into angular steps.
    ///
    /// The longitude step is stretched by `1 / cos(latitude)` of `origin` so
    /// that cells stay roughly square on the ground near that latitude.
    pub fn from_meters<C: Coordinate>(step_meters: f64, origin: &C) -> Self {
        let lat = (step_meters / EARTH_RADIUS).to_degrees();
        let lng = (step_meters / (EARTH_RADIUS * origin.lat().to_radians().cos())).to_degrees();
        Self { lat, lng }
    }

    /// Returns true if both steps can advance the lattice.
    pub fn is_usable(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.lat > 0.0 && self.lng > 0.0
    }
}

/// Two corners of the sampled area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRectangle {
    pub start: LatLng,
    pub end: LatLng,
}

impl BoundingRectangle {
    pub fn new<C: Coordinate>(start: &C, end: &C) -> Self {
        Self {
            start: start.to_lat_lng(),
            end: end.to_lat_lng(),
        }
    }

    /// Swaps components so that `start` is the south-west corner.
    pub fn normalized(&self) -> Result<Self, HeatmapError> {
        let values = [self.start.lat, self.start.lng, self.end.lat, self.end.lng];
        if values.iter().any(|v| v.is_nan()) {
            return Err(HeatmapError::InvalidExtent(format!(
                "cannot order corners {:?} and {:?}",
                self.start, self.end
            )));
        }

        Ok(Self {
            start: LatLng::new(
                self.start.lat.min(self.end.lat),
                self.start.lng.min(self.end.lng),
            ),
            end: LatLng::new(
                self.start.lat.max(self.end.lat),
                self.start.lng.max(self.end.lng),
            ),
        })
    }

    pub fn lat_span(&self) -> f64 {
        (self.end.lat - self.start.lat).abs()
    }

    pub fn lng_span(&self) -> f64 {
        (self.end.lng - self.start.lng).abs()
    }
}

/// The ordered sample points covering a rectangle.
///
/// Points are row-major: latitude outer, longitude inner. Every point is the
/// center of a cell extending half a step in each direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    points: Vec<LatLng>,
    area: BoundingRectangle,
    step: StepAngle,
    rows: usize,
    cols: usize,
}

impl Lattice {
    /// Generates the lattice for `area` at `step`.
    ///
    /// Both axes are half-open: points start at the south-west corner and stop
    /// strictly before the north-east one. A zero span or an unusable step
    /// yields an empty lattice. More than [`MAX_LATTICE_POINTS`] points is an
    /// `InvalidExtent` error.
    pub fn generate(area: &BoundingRectangle, step: StepAngle) -> Result<Self, HeatmapError> {
        let area = area.normalized()?;

        let (rows, cols) = if step.is_usable() {
            (
                axis_len(area.start.lat, area.end.lat, step.lat)?,
                axis_len(area.start.lng, area.end.lng, step.lng)?,
            )
        } else {
            (0, 0)
        };
        let (rows, cols) = if rows == 0 || cols == 0 {
            (0, 0)
        } else {
            (rows, cols)
        };

        let count = rows
            .checked_mul(cols)
            .filter(|&n| n <= MAX_LATTICE_POINTS)
            .ok_or_else(|| too_many_points(rows as f64 * cols as f64))?;

        let mut points = Vec::with_capacity(count);
        for i in 0..rows {
            let lat = area.start.lat + i as f64 * step.lat;
            for j in 0..cols {
                let lng = area.start.lng + j as f64 * step.lng;
                debug_assert!(lat < area.end.lat && lng < area.end.lng);
                points.push(LatLng::new(lat, lng));
            }
        }

        Ok(Self {
            points,
            area,
            step,
            rows,
            cols,
        })
    }

    /// Builds a lattice for `step_meters` around a destination.
    pub fn from_meters<C: Coordinate>(
        area: &BoundingRectangle,
        step_meters: f64,
        destination: &C,
    ) -> Result<Self, HeatmapError> {
        Self::generate(area, StepAngle::from_meters(step_meters, destination))
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn area(&self) -> &BoundingRectangle {
        &self.area
    }

    pub fn step(&self) -> StepAngle {
        self.step
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LatLng> {
        self.points.iter()
    }
}

/// Number of points `start + i * step` strictly below `end`.
fn axis_len(start: f64, end: f64, step: f64) -> Result<usize, HeatmapError> {
    let span = end - start;
    if span <= 0.0 {
        return Ok(0);
    }
    let estimate = (span / step).ceil();
    if estimate > MAX_LATTICE_POINTS as f64 {
        return Err(too_many_points(estimate));
    }

    // Rounding in span / step can leave ceil one off in either direction
    let mut len = estimate as usize;
    while len > 0 && start + (len - 1) as f64 * step >= end {
        len -= 1;
    }
    while len < MAX_LATTICE_POINTS && start + len as f64 * step < end {
        len += 1;
    }
    Ok(len)
}

fn too_many_points(count: f64) -> HeatmapError {
    HeatmapError::InvalidExtent(format!(
        "lattice would hold {count:.0} points, limit is {MAX_LATTICE_POINTS}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(a: (f64, f64), b: (f64, f64)) -> BoundingRectangle {
        BoundingRectangle::new(&LatLng::new(a.0, a.1), &LatLng::new(b.0, b.1))
    }

    #[test]
    fn test_point_count_matches_ceil() -> Result<(), HeatmapError> {
        let area = rect((10.0, 20.0), (11.0, 21.5));
        let step = StepAngle::new(0.25, 0.5);
        let lattice = Lattice::generate(&area, step)?;

        assert_eq!(lattice.rows(), 4);
        assert_eq!(lattice.cols(), 3);
        assert_eq!(lattice.len(), 12);

        let area = rect((10.0, 20.0), (11.0, 21.0));
        let lattice = Lattice::generate(&area, StepAngle::new(0.3, 0.75))?;
        assert_eq!(lattice.len(), 4 * 2);
        Ok(())
    }

    #[test]
    fn test_half_open_row_major() -> Result<(), HeatmapError> {
        let area = rect((0.0, 0.0), (1.0, 1.0));
        let lattice = Lattice::generate(&area, StepAngle::new(0.5, 0.5))?;

        assert_eq!(
            lattice.points(),
            &[
                LatLng::new(0.0, 0.0),
                LatLng::new(0.0, 0.5),
                LatLng::new(0.5, 0.0),
                LatLng::new(0.5, 0.5),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_corner_order_is_irrelevant() -> Result<(), HeatmapError> {
        let step = StepAngle::new(0.01, 0.02);
        let a = LatLng::new(55.80, 37.40);
        let b = LatLng::new(55.70, 37.50);

        let forward = Lattice::generate(&BoundingRectangle::new(&a, &b), step)?;
        let backward = Lattice::generate(&BoundingRectangle::new(&b, &a), step)?;

        assert!(!forward.is_empty());
        assert_eq!(forward.points(), backward.points());
        assert_eq!(forward.area(), backward.area());
        Ok(())
    }

    #[test]
    fn test_zero_span_is_empty() -> Result<(), HeatmapError> {
        let area = rect((10.0, 20.0), (10.0, 21.0));
        let lattice = Lattice::generate(&area, StepAngle::new(0.1, 0.1))?;
        assert!(lattice.is_empty());
        assert_eq!(lattice.rows(), 0);
        assert_eq!(lattice.cols(), 0);
        Ok(())
    }

    #[test]
    fn test_zero_step_is_empty() -> Result<(), HeatmapError> {
        let area = rect((10.0, 20.0), (11.0, 21.0));
        assert!(Lattice::generate(&area, StepAngle::new(0.0, 0.1))?.is_empty());
        assert!(Lattice::generate(&area, StepAngle::new(0.1, -0.1))?.is_empty());
        assert!(Lattice::generate(&area, StepAngle::new(f64::NAN, 0.1))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_oversized_lattice_is_invalid_extent() {
        let area = rect((0.0, 0.0), (1.0, 1.0));

        for step in [
            StepAngle::new(1e-12, 1e-12),
            StepAngle::new(1e-5, 1e-5),
            StepAngle::new(1.0, 1e-7),
        ] {
            assert!(matches!(
                Lattice::generate(&area, step),
                Err(HeatmapError::InvalidExtent(_))
            ));
        }

        let dest = LatLng::new(0.5, 0.5);
        assert!(matches!(
            Lattice::from_meters(&area, 0.000001, &dest),
            Err(HeatmapError::InvalidExtent(_))
        ));
    }

    #[test]
    fn test_lattice_at_limit_is_generated() -> Result<(), HeatmapError> {
        let area = rect((0.0, 0.0), (1.0, 0.5));
        let lattice = Lattice::generate(&area, StepAngle::new(1.0 / 512.0, 1.0 / 512.0))?;
        assert_eq!(lattice.len(), 512 * 256);
        assert!(lattice.len() <= MAX_LATTICE_POINTS);
        Ok(())
    }

    #[test]
    fn test_last_point_stays_below_end() -> Result<(), HeatmapError> {
        // 0.07 / 0.01 rounds up to 8 although 7 * 0.01 == 0.07
        let area = rect((0.0, 0.0), (0.07, 0.5));
        let lattice = Lattice::generate(&area, StepAngle::new(0.01, 0.5))?;

        assert_eq!(lattice.rows(), 7);
        assert_eq!(lattice.cols(), 1);
        assert!(lattice.iter().all(|p| p.lat < 0.07 && p.lng < 0.5));

        let area = rect((0.0, 0.0), (2.1, 2.1));
        let lattice = Lattice::generate(&area, StepAngle::new(0.3, 0.15))?;
        assert_eq!((lattice.rows(), lattice.cols()), (7, 14));
        assert!(lattice.iter().all(|p| p.lat < 2.1 && p.lng < 2.1));
        Ok(())
    }

    #[test]
    fn test_nan_corner_is_invalid_extent() {
        let area = rect((f64::NAN, 20.0), (11.0, 21.0));
        let result = Lattice::generate(&area, StepAngle::new(0.1, 0.1));
        assert!(matches!(result, Err(HeatmapError::InvalidExtent(_))));
    }

    #[test]
    fn test_step_from_meters_compensates_longitude() {
        let equator = StepAngle::from_meters(1000.0, &LatLng::new(0.0, 0.0));
        assert!((equator.lat - equator.lng).abs() < 1e-12);
        assert!((equator.lat - 0.008983).abs() < 1e-5);

        let moscow = StepAngle::from_meters(1000.0, &LatLng::new(55.75, 37.45));
        assert!((moscow.lat - equator.lat).abs() < 1e-12);
        let expected = equator.lng / 55.75_f64.to_radians().cos();
        assert!((moscow.lng - expected).abs() < 1e-12);
        assert!(moscow.lng > moscow.lat);
    }

    #[test]
    fn test_moscow_lattice_size() -> Result<(), HeatmapError> {
        let dest = LatLng::new(55.75, 37.45);
        let area = rect((55.70, 37.40), (55.80, 37.50));
        let lattice = Lattice::from_meters(&area, 1000.0, &dest)?;
        let step = lattice.step();

        let rows = ((55.80_f64 - 55.70) / step.lat).ceil() as usize;
        let cols = ((37.50_f64 - 37.40) / step.lng).ceil() as usize;
        assert_eq!(lattice.len(), rows * cols);
        assert_eq!(rows, 12);
        assert_eq!(cols, 7);
        Ok(())
    }
}
