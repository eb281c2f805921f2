use crate::error::HeatmapError;
use std::fmt;
use std::time::Duration;

/// Duration bucket of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// Reachable within the threshold; index in `[0, grades)`.
    Graded(u32),
    /// Slower than the threshold.
    Denied,
}

impl Zone {
    /// Style identifier shared by the overlay writers.
    pub fn style_id(&self) -> String {
        match self {
            Zone::Graded(i) => format!("zone-{i}"),
            Zone::Denied => "zone-denied".to_string(),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.style_id())
    }
}

/// Maps `duration` to its zone relative to `max_duration`.
///
/// Zones are `floor(grades * duration / max_duration)`, computed on whole
/// milliseconds. `duration == max_duration` falls into the last zone.
pub fn classify(
    duration: Duration,
    max_duration: Duration,
    grades: u32,
) -> Result<Zone, HeatmapError> {
    if max_duration.is_zero() {
        return Err(HeatmapError::InvalidThreshold);
    }
    if grades == 0 {
        return Err(HeatmapError::InvalidGrades);
    }
    if duration > max_duration {
        return Ok(Zone::Denied);
    }

    let grade = u128::from(grades) * duration.as_millis() / max_duration.as_millis().max(1);
    let grade = grade.min(u128::from(grades - 1)) as u32;
    Ok(Zone::Graded(grade))
}
