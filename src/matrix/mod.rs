pub mod client;
pub mod options;
pub mod request;

pub use client::{ClientFactory, GoogleClientFactory, GoogleMatrixClient, MatrixClient};
pub use options::{
    Avoid, DepartureTime, TrafficModel, TransitMode, TransitModes, TransitRoutingPreference,
    TravelMode, TravelOptions, Units, parse_local_time,
};
pub use request::{
    MatrixElement, MatrixRequest, MatrixResponse, MatrixRow, TextValue, resolve_results,
};
