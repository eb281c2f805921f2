//! # transit-heatmap
//!
//! Travel-time heatmaps: a rectangle is sampled on a regular lattice, every
//! sample point is routed to one destination through a distance-matrix
//! service, and the travel times are colored into zones.
//!
//! There are three main entry points.
//!
//! ### 1. `Lattice` - Sample Points
//!
//! ```
//! use transit_heatmap::{BoundingRectangle, LatLng, Lattice};
//!
//! # fn main() -> Result<(), transit_heatmap::HeatmapError> {
//! let destination = LatLng::new(55.75, 37.45);
//! let area = BoundingRectangle::new(&LatLng::new(55.70, 37.40), &LatLng::new(55.80, 37.50));
//!
//! // 1 km spacing, corrected for the destination's latitude
//! let lattice = Lattice::from_meters(&area, 1000.0, &destination)?;
//! println!("{} x {} points", lattice.rows(), lattice.cols());
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. `fetch_results` - Travel Times
//!
//! Batches of up to 25 origins are sent concurrently and the results come
//! back in lattice order:
//!
//! ```no_run
//! use transit_heatmap::{
//!     BoundingRectangle, FetchPlan, GoogleClientFactory, LatLng, PipelineConfig,
//!     TravelMode, TravelOptions, fetch_results,
//! };
//!
//! # async fn fetch() -> Result<(), transit_heatmap::HeatmapError> {
//! let plan = FetchPlan {
//!     destination: LatLng::new(55.75, 37.45),
//!     area: BoundingRectangle::new(&LatLng::new(55.70, 37.40), &LatLng::new(55.80, 37.50)),
//!     step_meters: 500.0,
//!     options: TravelOptions {
//!         mode: Some(TravelMode::Transit),
//!         ..Default::default()
//!     },
//! };
//!
//! let factory = GoogleClientFactory::new("API_KEY");
//! let store = fetch_results(factory, &plan, PipelineConfig::default()).await?;
//! store.save("moscow.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### 3. `OverlayDocument` - Rendering
//!
//! ```no_run
//! use std::time::Duration;
//! use transit_heatmap::{OverlayDocument, OverlayFormat, RenderConfig, ResultStore};
//!
//! # fn main() -> Result<(), transit_heatmap::HeatmapError> {
//! let store = ResultStore::load("moscow.json")?;
//! let config = RenderConfig::new(Duration::from_secs(30 * 60), 6)?;
//! let document = OverlayDocument::render(&store, &config)?;
//!
//! OverlayFormat::Kml.write(&document, std::io::stdout())?;
//! # Ok(())
//! # }
//! ```
//!

pub mod coord;
pub mod core;
pub mod error;
pub mod fetch;
pub mod io;
pub mod matrix;
pub mod render;

pub use coord::{Coordinate, LatLng};
pub use core::{
    BoundingRectangle, CellBounds, DEFAULT_GRADES, DEFAULT_MAX_DURATION_MINS,
    DEFAULT_STEP_METERS, DEFAULT_WORKERS, EARTH_RADIUS, Lattice, MAX_BATCH_SIZE,
    MAX_LATTICE_POINTS, StepAngle, Zone, classify, create_rectangle,
};
pub use error::HeatmapError;
pub use fetch::{BatchScheduler, FetchPlan, PipelineConfig, fetch_results, partition};
pub use io::{GeoJsonWriter, KmlWriter, ResultStore, ResultsToCsv, TravelResult, write_results_csv};
pub use matrix::{
    Avoid, ClientFactory, DepartureTime, GoogleClientFactory, GoogleMatrixClient, MatrixClient,
    MatrixRequest, MatrixResponse, TrafficModel, TransitMode, TransitModes,
    TransitRoutingPreference, TravelMode, TravelOptions, Units, parse_local_time,
};
pub use render::{
    OverlayDocument, OverlayFormat, OverlayWriter, Placemark, PlacemarkStyle, RenderConfig,
    ZoneStyle,
};

pub use geo_types;
