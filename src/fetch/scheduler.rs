use crate::coord::LatLng;
use crate::core::lattice::Lattice;
use crate::error::HeatmapError;
use crate::fetch::PipelineConfig;
use crate::fetch::worker::{BatchJob, worker_loop};
use crate::io::store::TravelResult;
use crate::matrix::client::ClientFactory;
use crate::matrix::options::TravelOptions;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// A contiguous run of lattice points sent in one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Position of the batch in lattice order
    pub index: usize,
    pub origins: Vec<LatLng>,
}

/// Result of one successfully fetched batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub index: usize,
    /// Number of origins that were sent
    pub origins: usize,
    pub results: Vec<TravelResult>,
}

/// Splits `points` into batches of at most `max_batch_size`, keeping order.
///
/// Only the last batch may be shorter. A zero batch size yields no batches.
pub fn partition(points: &[LatLng], max_batch_size: usize) -> Vec<Batch> {
    if max_batch_size == 0 {
        return Vec::new();
    }
    points
        .chunks(max_batch_size)
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            origins: chunk.to_vec(),
        })
        .collect()
}

/// Fans batches out to a fixed pool of workers and gathers their results.
///
/// Each worker owns one client and has at most one request in flight, so
/// `worker_count` bounds the number of concurrent requests. Results are
/// returned in lattice order regardless of completion order. The first
/// failing batch cancels the whole run.
pub struct BatchScheduler<F: ClientFactory> {
    factory: Arc<F>,
    config: PipelineConfig,
}

impl<F: ClientFactory> BatchScheduler<F> {
    pub fn new(factory: F, config: PipelineConfig) -> Self {
        Self::from_shared(Arc::new(factory), config)
    }

    pub fn from_shared(factory: Arc<F>, config: PipelineConfig) -> Self {
        Self { factory, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(
        &self,
        lattice: &Lattice,
        destination: LatLng,
        options: &TravelOptions,
    ) -> Result<Vec<TravelResult>, HeatmapError> {
        let batches = partition(lattice.points(), self.config.max_batch_size());
        if batches.is_empty() {
            tracing::info!("Lattice is empty, nothing to fetch");
            return Ok(Vec::new());
        }

        let total_batches = batches.len();
        let total_origins = lattice.len();
        let worker_count = self.config.worker_count().min(total_batches);

        tracing::info!(
            batches = total_batches,
            origins = total_origins,
            workers = worker_count,
            "Starting fetch"
        );

        let (queue_tx, queue_rx) = mpsc::channel::<Batch>(worker_count);
        let queue = Arc::new(Mutex::new(queue_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let job = Arc::new(BatchJob {
            destination,
            options: options.clone(),
            step: lattice.step(),
        });

        let mut tasks = JoinSet::new();
        for worker_id in 0..worker_count {
            tasks.spawn(worker_loop(
                worker_id,
                Arc::clone(&self.factory),
                Arc::clone(&job),
                Arc::clone(&queue),
                outcome_tx.clone(),
                shutdown.clone(),
            ));
        }
        drop(outcome_tx);
        drop(queue);
        tasks.spawn(dispatch(batches, queue_tx, shutdown.clone()));

        let mut slots: Vec<Option<Vec<TravelResult>>> = vec![None; total_batches];
        let mut received = 0;
        let mut fetched = 0;

        while received < total_batches {
            match outcome_rx.recv().await {
                Some(Ok(outcome)) => {
                    received += 1;
                    fetched += outcome.origins;
                    tracing::info!("Fetched {fetched}/{total_origins} origins");
                    if let Some(slot) = slots.get_mut(outcome.index) {
                        *slot = Some(outcome.results);
                    }
                }
                Some(Err(err)) => {
                    tracing::error!("Fetch failed, cancelling remaining batches: {err}");
                    shutdown.cancel();
                    tasks.shutdown().await;
                    return Err(err);
                }
                None => {
                    shutdown.cancel();
                    tasks.shutdown().await;
                    return Err(HeatmapError::ChannelError(format!(
                        "workers exited after {received} of {total_batches} batches"
                    )));
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            joined.map_err(|e| HeatmapError::ChannelError(e.to_string()))?;
        }

        let results: Vec<TravelResult> = slots.into_iter().flatten().flatten().collect();
        tracing::info!(
            results = results.len(),
            skipped = total_origins - results.len(),
            "Fetch complete"
        );
        Ok(results)
    }
}

/// Feeds batches into the bounded queue until done or cancelled.
async fn dispatch(batches: Vec<Batch>, queue: mpsc::Sender<Batch>, shutdown: CancellationToken) {
    for batch in batches {
        tokio::select! {
            () = shutdown.cancelled() => break,
            sent = queue.send(batch) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
}
