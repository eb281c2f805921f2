pub mod constants;
pub mod geometry;
pub mod lattice;
pub mod zone;

pub use constants::{
    DEFAULT_GRADES, DEFAULT_MAX_DURATION_MINS, DEFAULT_STEP_METERS, DEFAULT_WORKERS,
    DISTANCE_MATRIX_ENDPOINT, EARTH_RADIUS, MAX_BATCH_SIZE, MAX_LATTICE_POINTS,
};
pub use geometry::{CellBounds, create_rectangle};
pub use lattice::{BoundingRectangle, Lattice, StepAngle};
pub use zone::{Zone, classify};
