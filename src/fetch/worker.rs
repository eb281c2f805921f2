use crate::coord::LatLng;
use crate::core::lattice::StepAngle;
use crate::error::HeatmapError;
use crate::fetch::scheduler::{Batch, BatchOutcome};
use crate::matrix::client::{ClientFactory, MatrixClient};
use crate::matrix::options::TravelOptions;
use crate::matrix::request::{MatrixRequest, resolve_results};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

/// Per-run request parameters shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub destination: LatLng,
    pub options: TravelOptions,
    pub step: StepAngle,
}

/// Queue of pending batches shared by all workers.
pub(crate) type WorkQueue = Arc<Mutex<mpsc::Receiver<Batch>>>;

/// Outcome channel from workers back to the collector.
pub(crate) type OutcomeSender = mpsc::UnboundedSender<Result<BatchOutcome, HeatmapError>>;

/// Runs one batch through the client and validates the response.
pub async fn fetch_batch<C: MatrixClient>(
    client: &C,
    job: &BatchJob,
    batch: Batch,
) -> Result<BatchOutcome, HeatmapError> {
    let request = MatrixRequest::new(&batch.origins, &job.destination, &job.options);
    let response = client.distance_matrix(&request).await?;
    response.check_status()?;

    let results = resolve_results(batch.index, &batch.origins, &response, job.step)?;

    tracing::debug!(
        batch = batch.index,
        origins = batch.origins.len(),
        results = results.len(),
        "Batch fetched"
    );

    Ok(BatchOutcome {
        index: batch.index,
        origins: batch.origins.len(),
        results,
    })
}

/// Worker task: owns one client and drains the shared queue.
///
/// The worker stops when the queue is closed, when `shutdown` is cancelled,
/// or after reporting its first error. Client creation failures are reported
/// through the outcome channel like any other error.
pub(crate) async fn worker_loop<F: ClientFactory>(
    worker_id: usize,
    factory: Arc<F>,
    job: Arc<BatchJob>,
    queue: WorkQueue,
    outcomes: OutcomeSender,
    shutdown: CancellationToken,
) {
    tracing::trace!("Worker {worker_id} started");

    let client = match factory.create_client() {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("Worker {worker_id} failed to create client: {err}");
            let _ = outcomes.send(Err(err));
            return;
        }
    };

    loop {
        let batch = tokio::select! {
            () = shutdown.cancelled() => None,
            batch = next_batch(&queue) => batch,
        };
        let Some(batch) = batch else {
            break;
        };

        let index = batch.index;
        let outcome = fetch_batch(&client, &job, batch).await;
        let failed = outcome.is_err();

        if let Err(err) = &outcome {
            tracing::error!("Worker {worker_id} failed on batch {index}: {err}");
        }
        if outcomes.send(outcome).is_err() || failed {
            break;
        }
    }

    tracing::trace!("Worker {worker_id} stopped");
}

async fn next_batch(queue: &WorkQueue) -> Option<Batch> {
    queue.lock().await.recv().await
}
