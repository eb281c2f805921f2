//! Heatmap overlay model.
//!
//! [`OverlayDocument::render`] turns a [`ResultStore`] into styled polygons:
//! one boundary polygon for the sampled area followed by one cell per result,
//! each referencing the shared style of its [`Zone`]. Writers in
//! [`crate::io`] serialize the document as KML or GeoJSON.

pub mod style;

pub use style::{Rgba, ZoneStyle, zone_color, zone_styles};

use crate::core::geometry::CellBounds;
use crate::core::zone::{Zone, classify};
use crate::error::HeatmapError;
use crate::io::geojson::GeoJsonWriter;
use crate::io::kml::KmlWriter;
use crate::io::store::ResultStore;
use geo_types::Polygon;
use rayon::prelude::*;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

pub const BOUNDARY_NAME: &str = "Sampled area";

/// Threshold and zone count used to classify results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    max_duration: Duration,
    grades: u32,
}

impl RenderConfig {
    pub fn new(max_duration: Duration, grades: u32) -> Result<Self, HeatmapError> {
        if max_duration.is_zero() {
            return Err(HeatmapError::InvalidThreshold);
        }
        if grades == 0 {
            return Err(HeatmapError::InvalidGrades);
        }
        Ok(Self {
            max_duration,
            grades,
        })
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    pub fn grades(&self) -> u32 {
        self.grades
    }
}

/// How a placemark is styled.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacemarkStyle {
    /// Reference to a document-level style by id.
    Shared(String),
    /// Style embedded in the placemark itself.
    Inline(ZoneStyle),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub name: String,
    pub style: PlacemarkStyle,
    pub polygon: Polygon<f64>,
    /// Zone of a result cell; `None` for the boundary.
    pub zone: Option<Zone>,
}

/// A renderable heatmap: shared styles plus one folder of placemarks.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayDocument {
    pub name: String,
    pub styles: Vec<ZoneStyle>,
    pub folder_name: String,
    pub placemarks: Vec<Placemark>,
}

impl OverlayDocument {
    pub fn render(store: &ResultStore, config: &RenderConfig) -> Result<Self, HeatmapError> {
        let boundary = Placemark {
            name: BOUNDARY_NAME.to_string(),
            style: PlacemarkStyle::Inline(ZoneStyle::boundary()),
            polygon: CellBounds::from(&store.area()).to_polygon(),
            zone: None,
        };

        let step = store.cell_step();
        let cells = store
            .results
            .par_iter()
            .map(|result| -> Result<Placemark, HeatmapError> {
                let zone = classify(result.duration(), config.max_duration, config.grades)?;
                let bounds = result.cell_bounds(step)?;
                Ok(Placemark {
                    name: format!("{:.0} min", result.minutes()),
                    style: PlacemarkStyle::Shared(zone.style_id()),
                    polygon: bounds.to_polygon(),
                    zone: Some(zone),
                })
            })
            .collect::<Result<Vec<_>, HeatmapError>>()?;

        let mut placemarks = Vec::with_capacity(cells.len() + 1);
        placemarks.push(boundary);
        placemarks.extend(cells);

        tracing::debug!(
            placemarks = placemarks.len(),
            grades = config.grades,
            "Rendered overlay document"
        );

        Ok(Self {
            name: "Travel time heatmap".to_string(),
            styles: zone_styles(config.grades),
            folder_name: format!(
                "Up to {} min",
                (config.max_duration.as_secs_f64() / 60.0).round()
            ),
            placemarks,
        })
    }

    pub fn boundary(&self) -> Option<&Placemark> {
        self.placemarks.first().filter(|p| p.zone.is_none())
    }

    pub fn cells(&self) -> impl Iterator<Item = &Placemark> {
        self.placemarks.iter().filter(|p| p.zone.is_some())
    }
}

/// Serialization sink for an [`OverlayDocument`].
pub trait OverlayWriter {
    fn write_overlay<W: Write>(
        &self,
        document: &OverlayDocument,
        out: W,
    ) -> Result<(), HeatmapError>;
}

/// Output format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayFormat {
    #[default]
    Kml,
    GeoJson,
}

impl OverlayFormat {
    pub fn write<W: Write>(&self, document: &OverlayDocument, out: W) -> Result<(), HeatmapError> {
        match self {
            OverlayFormat::Kml => KmlWriter::default().write_overlay(document, out),
            OverlayFormat::GeoJson => GeoJsonWriter::default().write_overlay(document, out),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OverlayFormat::Kml => "kml",
            OverlayFormat::GeoJson => "geojson",
        }
    }
}

impl FromStr for OverlayFormat {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kml" => Ok(OverlayFormat::Kml),
            "geojson" | "json" => Ok(OverlayFormat::GeoJson),
            _ => Err(HeatmapError::UnknownOption {
                field: "format",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OverlayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
