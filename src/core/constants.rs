/// Equatorial earth radius in meters used to turn a step distance into angles
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Maximum origins per distance-matrix request
pub const MAX_BATCH_SIZE: usize = 25;

/// Largest lattice a single run may sample
pub const MAX_LATTICE_POINTS: usize = 250_000;

/// Default number of concurrent fetch workers
pub const DEFAULT_WORKERS: usize = 20;

/// Default number of duration zones in the rendered heatmap
pub const DEFAULT_GRADES: u32 = 6;

/// Default lattice step in meters
pub const DEFAULT_STEP_METERS: f64 = 500.0;

/// Default maximum travel time in minutes
pub const DEFAULT_MAX_DURATION_MINS: u64 = 30;

/// Public distance-matrix JSON endpoint
pub const DISTANCE_MATRIX_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Element/response status that marks a usable answer
pub const STATUS_OK: &str = "OK";
