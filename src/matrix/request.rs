use crate::coord::LatLng;
use crate::core::constants::STATUS_OK;
use crate::core::geometry::CellBounds;
use crate::core::lattice::StepAngle;
use crate::error::HeatmapError;
use crate::io::store::TravelResult;
use crate::matrix::options::TravelOptions;
use serde::{Deserialize, Serialize};

/// One distance-matrix call: many origins against a single destination.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRequest {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub options: TravelOptions,
}

impl MatrixRequest {
    pub fn new(origins: &[LatLng], destination: &LatLng, options: &TravelOptions) -> Self {
        Self {
            origins: origins.iter().map(LatLng::to_request_string).collect(),
            destinations: vec![destination.to_request_string()],
            options: options.clone(),
        }
    }

    /// Query parameters without the API key.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("origins", self.origins.join("|")),
            ("destinations", self.destinations.join("|")),
        ];
        params.extend(self.options.query_params());
        params
    }
}

/// Text/value pair as returned by the service; `value` is in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    pub value: u64,
    #[serde(default)]
    pub text: String,
}

impl TextValue {
    pub fn seconds(value: u64) -> Self {
        Self {
            value,
            text: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixElement {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_in_traffic: Option<TextValue>,
}

impl MatrixElement {
    pub fn ok(duration_secs: u64) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            duration: Some(TextValue::seconds(duration_secs)),
            duration_in_traffic: None,
        }
    }

    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Default::default()
        }
    }

    /// Traffic-adjusted duration when present and positive, else the baseline.
    pub fn resolved_seconds(&self) -> Option<u64> {
        match &self.duration_in_traffic {
            Some(traffic) if traffic.value > 0 => Some(traffic.value),
            _ => self.duration.as_ref().map(|d| d.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow {
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

/// Distance-matrix response; one row per origin in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

impl MatrixResponse {
    pub fn from_rows(rows: Vec<MatrixRow>) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            error_message: None,
            rows,
        }
    }

    /// Fails unless the top-level status is OK.
    pub fn check_status(&self) -> Result<(), HeatmapError> {
        if self.status == STATUS_OK {
            return Ok(());
        }
        Err(HeatmapError::RemoteService {
            status: self.status.clone(),
            message: self.error_message.clone().unwrap_or_default(),
        })
    }
}

/// Turns a response into results aligned with `origins`.
///
/// A row count that differs from the origin count fails the whole batch.
/// Rows that do not hold exactly one OK element are logged and dropped.
pub fn resolve_results(
    batch: usize,
    origins: &[LatLng],
    response: &MatrixResponse,
    step: StepAngle,
) -> Result<Vec<TravelResult>, HeatmapError> {
    if origins.len() != response.rows.len() {
        return Err(HeatmapError::BatchSizeMismatch {
            batch,
            expected: origins.len(),
            actual: response.rows.len(),
        });
    }

    let mut results = Vec::with_capacity(origins.len());

    for (i, (origin, row)) in origins.iter().zip(&response.rows).enumerate() {
        if row.elements.len() != 1 {
            tracing::warn!(batch, row = i, %origin, ?row, "Row elements != 1, skipping");
            continue;
        }
        let element = &row.elements[0];
        if element.status != STATUS_OK {
            tracing::warn!(batch, row = i, %origin, ?row, "Row status != OK, skipping");
            continue;
        }
        let Some(seconds) = element.resolved_seconds() else {
            tracing::warn!(batch, row = i, %origin, ?row, "Row has no duration, skipping");
            continue;
        };

        results.push(TravelResult {
            coordinate: *origin,
            duration_seconds: seconds,
            bounds: Some(CellBounds::around(origin, step)),
        });
    }

    Ok(results)
}
