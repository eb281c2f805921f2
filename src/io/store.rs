use crate::coord::LatLng;
use crate::core::geometry::CellBounds;
use crate::core::lattice::{BoundingRectangle, StepAngle};
use crate::error::HeatmapError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

/// Travel time from one sample point to the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelResult {
    /// Sample point (cell center)
    pub coordinate: LatLng,
    /// Resolved travel time in whole seconds
    pub duration_seconds: u64,
    /// Cell corners, when known at fetch time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<CellBounds>,
}

impl TravelResult {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds)
    }

    pub fn minutes(&self) -> f64 {
        self.duration_seconds as f64 / 60.0
    }

    /// Stored bounds, or the cell of `step` centered on the coordinate.
    pub fn cell_bounds(&self, step: Option<StepAngle>) -> Result<CellBounds, HeatmapError> {
        match (self.bounds, step) {
            (Some(bounds), _) => Ok(bounds),
            (None, Some(step)) => Ok(CellBounds::around(&self.coordinate, step)),
            (None, None) => Err(HeatmapError::MissingCellBounds(self.coordinate.to_string())),
        }
    }
}

/// Coordinate differences below this are treated as the same lattice line.
const SPACING_EPSILON: f64 = 1e-9;

/// Everything fetched in one run: the sampled area and its results.
///
/// This is the hand-off between the fetch and render phases and is stored as
/// pretty-printed JSON so that runs can be diffed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultStore {
    pub area_start: LatLng,
    pub area_end: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<StepAngle>,
    #[serde(default)]
    pub results: Vec<TravelResult>,
}

impl ResultStore {
    pub fn new(area: &BoundingRectangle, step: Option<StepAngle>) -> Self {
        Self {
            area_start: area.start,
            area_end: area.end,
            step,
            results: Vec::new(),
        }
    }

    pub fn area(&self) -> BoundingRectangle {
        BoundingRectangle::new(&self.area_start, &self.area_end)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TravelResult> {
        self.results.iter()
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = TravelResult>) {
        self.results.extend(results);
    }

    /// Step used for results that carry no bounds.
    ///
    /// Without a stored step, each axis uses the smallest spacing between
    /// distinct result coordinates, or the area span when the results sit on
    /// a single line. `None` only when neither gives a positive step.
    pub fn cell_step(&self) -> Option<StepAngle> {
        if let Some(step) = self.step {
            return Some(step);
        }

        let area = self.area().normalized().ok()?;
        let lat = min_spacing(self.results.iter().map(|r| r.coordinate.lat))
            .unwrap_or_else(|| area.lat_span());
        let lng = min_spacing(self.results.iter().map(|r| r.coordinate.lng))
            .unwrap_or_else(|| area.lng_span());

        let step = StepAngle::new(lat, lng);
        step.is_usable().then_some(step)
    }

    /// Bounds of a result, derived from [`Self::cell_step`] if it has none.
    pub fn cell_bounds(&self, result: &TravelResult) -> Result<CellBounds, HeatmapError> {
        result.cell_bounds(self.cell_step())
    }

    pub fn to_json_string(&self) -> Result<String, HeatmapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, HeatmapError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), HeatmapError> {
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_json<R: Read>(reader: R) -> Result<Self, HeatmapError> {
        Ok(serde_json::from_reader(BufReader::new(reader))?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HeatmapError> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| HeatmapError::IoError(format!("{}: {e}", path.display())))?;
        self.write_json(file)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, HeatmapError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| HeatmapError::IoError(format!("{}: {e}", path.display())))?;
        Self::read_json(file)
    }
}

fn min_spacing(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut values: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    values.sort_by(f64::total_cmp);
    values
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|gap| *gap > SPACING_EPSILON)
        .reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_store() -> ResultStore {
        let area = BoundingRectangle::new(&LatLng::new(55.70, 37.40), &LatLng::new(55.80, 37.50));
        let step = StepAngle::from_meters(1000.0, &LatLng::new(55.75, 37.45));
        let mut store = ResultStore::new(&area, Some(step));
        store.extend([
            TravelResult {
                coordinate: LatLng::new(55.70, 37.40),
                duration_seconds: 600,
                bounds: Some(CellBounds::around(&LatLng::new(55.70, 37.40), step)),
            },
            TravelResult {
                coordinate: LatLng::new(55.708983, 37.415962),
                duration_seconds: 1234,
                bounds: None,
            },
        ]);
        store
    }

    #[test]
    fn test_json_roundtrip() -> Result<(), HeatmapError> {
        let store = sample_store();
        let json = store.to_json_string()?;
        let back = ResultStore::from_json_str(&json)?;
        assert_eq!(store, back);
        Ok(())
    }

    #[test]
    fn test_json_field_names() -> Result<(), HeatmapError> {
        let json = sample_store().to_json_string()?;
        assert!(json.contains("\"areaStart\""));
        assert!(json.contains("\"areaEnd\""));
        assert!(json.contains("\"durationSeconds\": 600"));
        assert!(json.contains("\"coordinate\""));
        Ok(())
    }

    #[test]
    fn test_minimal_json_is_accepted() -> Result<(), HeatmapError> {
        let json = r#"{
            "areaStart": {"lat": 1.0, "lng": 2.0},
            "areaEnd": {"lat": 3.0, "lng": 4.0},
            "results": [{"coordinate": {"lat": 1.5, "lng": 2.5}, "durationSeconds": 90}]
        }"#;
        let store = ResultStore::from_json_str(json)?;
        assert_eq!(store.len(), 1);
        assert_eq!(store.step, None);
        assert_eq!(store.results[0].duration(), Duration::from_secs(90));
        assert_eq!(store.results[0].minutes(), 1.5);
        Ok(())
    }

    #[test]
    fn test_file_roundtrip() -> Result<(), HeatmapError> {
        let dir = tempdir()?;
        let path = dir.path().join("results.json");

        let store = sample_store();
        store.save(&path)?;
        let back = ResultStore::load(&path)?;

        assert_eq!(store, back);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let result = ResultStore::load("/definitely/not/here.json");
        assert!(matches!(result, Err(HeatmapError::IoError(_))));
    }

    #[test]
    fn test_cell_bounds_fallback() -> Result<(), HeatmapError> {
        let mut store = sample_store();
        let step = store.step.expect("sample store has a step");
        let derived = store.cell_bounds(&store.results[1])?;
        assert_eq!(derived, CellBounds::around(&store.results[1].coordinate, step));

        // Without a stored step the spacing between results is used
        store.step = None;
        let inferred = store.cell_step().expect("two distinct results");
        assert!((inferred.lat - 0.008983).abs() < 1e-9);
        assert!((inferred.lng - 0.015962).abs() < 1e-9);
        assert_eq!(store.cell_bounds(&store.results[0])?, store.results[0].bounds.expect("stored"));
        Ok(())
    }

    #[test]
    fn test_minimal_store_uses_area_span() -> Result<(), HeatmapError> {
        let json = r#"{
            "areaStart": {"lat": 1.0, "lng": 2.0},
            "areaEnd": {"lat": 3.0, "lng": 4.0},
            "results": [{"coordinate": {"lat": 1.5, "lng": 2.5}, "durationSeconds": 90}]
        }"#;
        let store = ResultStore::from_json_str(json)?;

        assert_eq!(store.cell_step(), Some(StepAngle::new(2.0, 2.0)));
        let bounds = store.cell_bounds(&store.results[0])?;
        assert_eq!(bounds.a, LatLng::new(2.5, 1.5));
        assert_eq!(bounds.c, LatLng::new(0.5, 3.5));
        Ok(())
    }

    #[test]
    fn test_degenerate_store_has_no_bounds() {
        let point = LatLng::new(1.0, 2.0);
        let mut store = ResultStore::new(&BoundingRectangle::new(&point, &point), None);
        store.extend([TravelResult {
            coordinate: point,
            duration_seconds: 60,
            bounds: None,
        }]);

        assert_eq!(store.cell_step(), None);
        assert!(matches!(
            store.cell_bounds(&store.results[0]),
            Err(HeatmapError::MissingCellBounds(_))
        ));
    }

}
