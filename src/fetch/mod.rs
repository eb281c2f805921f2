//! Concurrent collection of travel times for a lattice.
//!
//! A [`FetchPlan`] describes what to sample, a [`PipelineConfig`] how hard to
//! hit the remote service. [`fetch_results`] ties both together and produces
//! a [`ResultStore`] ready to be saved or rendered.

pub mod scheduler;
pub mod worker;

#[cfg(test)]
pub(crate) mod mock;

pub use scheduler::{Batch, BatchOutcome, BatchScheduler, partition};
pub use worker::{BatchJob, fetch_batch};

use crate::coord::LatLng;
use crate::core::constants::{DEFAULT_WORKERS, MAX_BATCH_SIZE};
use crate::core::lattice::{BoundingRectangle, Lattice};
use crate::error::HeatmapError;
use crate::io::store::ResultStore;
use crate::matrix::client::ClientFactory;
use crate::matrix::options::TravelOptions;

/// Batch size and concurrency limits for one fetch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    max_batch_size: usize,
    worker_count: usize,
}

impl PipelineConfig {
    pub fn new(max_batch_size: usize, worker_count: usize) -> Result<Self, HeatmapError> {
        if !(1..=MAX_BATCH_SIZE).contains(&max_batch_size) {
            return Err(HeatmapError::InvalidConfig(format!(
                "batch size must be between 1 and {MAX_BATCH_SIZE}, got {max_batch_size}"
            )));
        }
        if worker_count == 0 {
            return Err(HeatmapError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_batch_size,
            worker_count,
        })
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE,
            worker_count: DEFAULT_WORKERS,
        }
    }
}

/// What to sample: the area, its spacing and the common destination.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPlan {
    pub destination: LatLng,
    pub area: BoundingRectangle,
    /// Distance between neighbouring sample points, in meters
    pub step_meters: f64,
    pub options: TravelOptions,
}

impl FetchPlan {
    /// The lattice of sample points, with step angles computed at the
    /// destination's latitude.
    pub fn lattice(&self) -> Result<Lattice, HeatmapError> {
        Lattice::from_meters(&self.area, self.step_meters, &self.destination)
    }
}

/// Samples every lattice point of `plan` and collects the travel times.
pub async fn fetch_results<F: ClientFactory>(
    factory: F,
    plan: &FetchPlan,
    config: PipelineConfig,
) -> Result<ResultStore, HeatmapError> {
    let lattice = plan.lattice()?;
    tracing::info!(
        rows = lattice.rows(),
        cols = lattice.cols(),
        points = lattice.len(),
        destination = %plan.destination,
        "Generated lattice"
    );

    let scheduler = BatchScheduler::new(factory, config);
    let results = scheduler
        .run(&lattice, plan.destination, &plan.options)
        .await?;

    let mut store = ResultStore::new(lattice.area(), Some(lattice.step()));
    store.extend(results);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::MockFactory;

    #[test]
    fn test_pipeline_config_bounds() {
        assert!(PipelineConfig::new(25, 20).is_ok());
        assert!(PipelineConfig::new(1, 1).is_ok());
        assert!(matches!(
            PipelineConfig::new(26, 20),
            Err(HeatmapError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::new(0, 20),
            Err(HeatmapError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::new(25, 0),
            Err(HeatmapError::InvalidConfig(_))
        ));
        assert_eq!(PipelineConfig::default(), PipelineConfig::new(25, 20).unwrap());
    }

    #[tokio::test]
    async fn test_fetch_results_fills_store() -> Result<(), HeatmapError> {
        let plan = FetchPlan {
            destination: LatLng::new(55.75, 37.45),
            area: BoundingRectangle::new(&LatLng::new(55.70, 37.40), &LatLng::new(55.80, 37.50)),
            step_meters: 1000.0,
            options: TravelOptions::default(),
        };
        let factory = MockFactory::uniform(420);

        let store = fetch_results(factory.clone(), &plan, PipelineConfig::default()).await?;

        let lattice = plan.lattice()?;
        assert_eq!(store.len(), lattice.len());
        assert_eq!(store.step, Some(lattice.step()));
        assert_eq!(store.area_start, LatLng::new(55.70, 37.40));
        assert_eq!(factory.calls(), lattice.len().div_ceil(25));
        Ok(())
    }
}
