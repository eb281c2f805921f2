use crate::error::HeatmapError;
use crate::io::store::ResultStore;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct CsvRow {
    lat: f64,
    lng: f64,
    duration_seconds: u64,
    duration_minutes: f64,
}

/// Writes one row per result: `lat,lng,duration_seconds,duration_minutes`.
pub fn write_results_csv<W: Write>(store: &ResultStore, writer: W) -> Result<(), HeatmapError> {
    let mut writer = csv::Writer::from_writer(writer);

    for result in store.iter() {
        writer.serialize(CsvRow {
            lat: result.coordinate.lat,
            lng: result.coordinate.lng,
            duration_seconds: result.duration_seconds,
            duration_minutes: (result.minutes() * 10.0).round() / 10.0,
        })?;
    }

    writer.flush()?;
    Ok(())
}

pub trait ResultsToCsv {
    fn to_csv(&self, path: impl AsRef<Path>) -> Result<(), HeatmapError>;
}

impl ResultsToCsv for ResultStore {
    fn to_csv(&self, path: impl AsRef<Path>) -> Result<(), HeatmapError> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| HeatmapError::IoError(format!("{}: {e}", path.display())))?;
        write_results_csv(self, file)
    }
}
