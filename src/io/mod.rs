pub mod csv;
pub mod geojson;
pub mod kml;
pub mod store;

pub use self::csv::{ResultsToCsv, write_results_csv};
pub use self::geojson::GeoJsonWriter;
pub use kml::KmlWriter;
pub use store::{ResultStore, TravelResult};
