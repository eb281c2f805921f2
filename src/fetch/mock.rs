//! In-memory matrix client for exercising the fetch pipeline.

use crate::error::HeatmapError;
use crate::matrix::client::{ClientFactory, MatrixClient};
use crate::matrix::request::{MatrixElement, MatrixRequest, MatrixResponse, MatrixRow};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder =
    Arc<dyn Fn(&MatrixRequest) -> Result<MatrixResponse, HeatmapError> + Send + Sync>;

#[derive(Default)]
struct MockState {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<MatrixRequest>>,
}

/// Hands out [`MockClient`]s that share one responder and one set of counters.
#[derive(Clone)]
pub(crate) struct MockFactory {
    responder: Responder,
    delay: Option<Duration>,
    fail_creation: bool,
    state: Arc<MockState>,
}

impl MockFactory {
    pub(crate) fn new(
        responder: impl Fn(&MatrixRequest) -> Result<MatrixResponse, HeatmapError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            delay: None,
            fail_creation: false,
            state: Arc::new(MockState::default()),
        }
    }

    /// Every origin gets an OK element with `seconds`.
    pub(crate) fn uniform(seconds: u64) -> Self {
        Self::new(move |request| {
            let rows = request
                .origins
                .iter()
                .map(|_| MatrixRow {
                    elements: vec![MatrixElement::ok(seconds)],
                })
                .collect();
            Ok(MatrixResponse::from_rows(rows))
        })
    }

    /// A factory whose clients can never be created.
    pub(crate) fn failing() -> Self {
        let mut factory = Self::uniform(0);
        factory.fail_creation = true;
        factory
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<MatrixRequest> {
        self.state
            .requests
            .lock()
            .expect("requests lock poisoned")
            .clone()
    }
}

impl ClientFactory for MockFactory {
    type Client = MockClient;

    fn create_client(&self) -> Result<Self::Client, HeatmapError> {
        if self.fail_creation {
            return Err(HeatmapError::ClientCreation("mock refused".to_string()));
        }
        Ok(MockClient {
            responder: Arc::clone(&self.responder),
            delay: self.delay,
            state: Arc::clone(&self.state),
        })
    }
}

pub(crate) struct MockClient {
    responder: Responder,
    delay: Option<Duration>,
    state: Arc<MockState>,
}

impl MatrixClient for MockClient {
    async fn distance_matrix(
        &self,
        request: &MatrixRequest,
    ) -> Result<MatrixResponse, HeatmapError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.state
            .requests
            .lock()
            .expect("requests lock poisoned")
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.responder)(request)
    }
}
