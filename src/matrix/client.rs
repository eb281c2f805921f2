use crate::core::constants::DISTANCE_MATRIX_ENDPOINT;
use crate::error::HeatmapError;
use crate::matrix::request::{MatrixRequest, MatrixResponse};
use std::future::Future;
use std::time::Duration;

/// A handle able to run distance-matrix requests.
///
/// Each fetch worker owns exactly one client, so a client never has more
/// than one request in flight.
pub trait MatrixClient: Send + Sync + 'static {
    fn distance_matrix(
        &self,
        request: &MatrixRequest,
    ) -> impl Future<Output = Result<MatrixResponse, HeatmapError>> + Send;
}

/// Builds one [`MatrixClient`] per worker.
pub trait ClientFactory: Send + Sync + 'static {
    type Client: MatrixClient;

    fn create_client(&self) -> Result<Self::Client, HeatmapError>;
}

/// Client for the Google Distance Matrix JSON API.
#[derive(Debug, Clone)]
pub struct GoogleMatrixClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl MatrixClient for GoogleMatrixClient {
    async fn distance_matrix(
        &self,
        request: &MatrixRequest,
    ) -> Result<MatrixResponse, HeatmapError> {
        let mut params = request.query_params();
        params.push(("key", self.api_key.clone()));

        tracing::debug!(origins = request.origins.len(), "Requesting distance matrix");

        let response = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| HeatmapError::Transport(e.without_url().to_string()))?
            .error_for_status()
            .map_err(|e| HeatmapError::Transport(e.without_url().to_string()))?;

        response
            .json()
            .await
            .map_err(|e| HeatmapError::Transport(e.without_url().to_string()))
    }
}

/// Creates [`GoogleMatrixClient`]s sharing one API key.
#[derive(Debug, Clone)]
pub struct GoogleClientFactory {
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl GoogleClientFactory {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DISTANCE_MATRIX_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ClientFactory for GoogleClientFactory {
    type Client = GoogleMatrixClient;

    fn create_client(&self) -> Result<Self::Client, HeatmapError> {
        if self.api_key.trim().is_empty() {
            return Err(HeatmapError::ClientCreation("API key is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| HeatmapError::ClientCreation(e.to_string()))?;

        Ok(GoogleMatrixClient {
            http,
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
        })
    }
}
