/// Error type for transit-heatmap operations.
#[derive(Debug, thiserror::Error)]
pub enum HeatmapError {
    /// A coordinate string or value could not be interpreted.
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
    /// The sampling rectangle cannot be ordered (e.g. a NaN corner).
    #[error("Invalid extent: {0}")]
    InvalidExtent(String),
    /// A travel option was given a value outside its enumeration.
    #[error("Unknown {field} {value:?}")]
    UnknownOption { field: &'static str, value: String },
    /// A departure/arrival time could not be parsed.
    #[error("Invalid time {value:?}: {reason}")]
    InvalidTime { value: String, reason: String },
    /// The maximum duration threshold is zero.
    #[error("Invalid threshold: maximum duration must be positive")]
    InvalidThreshold,
    /// The zone count is zero.
    #[error("Invalid grades: zone count must be positive")]
    InvalidGrades,
    /// Pipeline configuration is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// A worker could not build its remote-service client.
    #[error("Failed to create client: {0}")]
    ClientCreation(String),
    /// The remote call failed below the service protocol (network, decoding).
    #[error("Transport error: {0}")]
    Transport(String),
    /// The remote service answered with a non-OK top-level status.
    #[error("Remote service returned {status}: {message}")]
    RemoteService { status: String, message: String },
    /// The response row count differs from the request origin count.
    #[error("Batch {batch}: response has {actual} rows for {expected} origins")]
    BatchSizeMismatch {
        batch: usize,
        expected: usize,
        actual: usize,
    },
    /// A stored result has no bounds and the store carries no step.
    #[error("Result at {0} has no cell bounds and the store has no step")]
    MissingCellBounds(String),
    /// Internal channel failure between pipeline tasks.
    #[error("Channel error: {0}")]
    ChannelError(String),
    /// Writing or reading a JSON/XML document failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(String),
    /// CSV writing error.
    #[error("CSV error: {0}")]
    CsvError(String),
}

pub type Result<T> = std::result::Result<T, HeatmapError>;

impl From<std::io::Error> for HeatmapError {
    fn from(err: std::io::Error) -> Self {
        HeatmapError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for HeatmapError {
    fn from(err: serde_json::Error) -> Self {
        HeatmapError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for HeatmapError {
    fn from(err: csv::Error) -> Self {
        HeatmapError::CsvError(err.to_string())
    }
}
