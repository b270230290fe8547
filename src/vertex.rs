//! Vertex AI embedding provider using the text-embedding REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::{VertexSettings, DEFAULT_DIMENSIONS};
use crate::embedding::EmbeddingProvider;
use crate::error::{MedRagError, Result};

/// The default Vertex text-embedding model.
pub const DEFAULT_MODEL: &str = "textembedding-gecko@003";

/// Maximum number of texts per embedding request.
const MAX_BATCH: usize = 5;

/// Task type sent with retrieval-corpus embedding requests.
const TASK_TYPE: &str = "RETRIEVAL_DOCUMENT";

/// An [`EmbeddingProvider`] backed by the Vertex AI embeddings endpoint.
///
/// Uses `reqwest` to call the `publishers/google/models/{model}:predict`
/// endpoint directly. Input batches larger than the endpoint maximum are
/// split into consecutive requests, issued in order, with the results
/// concatenated in order.
///
/// # Configuration
///
/// Requires a project id, region, and OAuth2 bearer token — all validated at
/// construction, before any network call. A backend that cannot be reached or
/// authenticated surfaces as
/// [`MedRagError::BackendUnavailable`] at first use.
///
/// # Example
///
/// ```rust,ignore
/// use medrag::{VertexEmbeddingProvider, VertexSettings};
///
/// let provider = VertexEmbeddingProvider::new(VertexSettings::from_env())?;
/// let embedding = provider.embed("interleukin-6 signaling").await?;
/// ```
pub struct VertexEmbeddingProvider {
    client: reqwest::Client,
    project_id: String,
    region: String,
    access_token: String,
    model: String,
    dimensions: usize,
}

impl VertexEmbeddingProvider {
    /// Create a new provider from the given connection parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MedRagError::ConfigError`] when the project id, region, or
    /// access token is absent.
    pub fn new(settings: VertexSettings) -> Result<Self> {
        let project_id = settings.project_id.ok_or_else(|| {
            MedRagError::ConfigError(
                "Vertex backend requires a project id (set VERTEX_PROJECT_ID)".to_string(),
            )
        })?;
        if settings.region.is_empty() {
            return Err(MedRagError::ConfigError(
                "Vertex backend requires a region (set VERTEX_REGION)".to_string(),
            ));
        }
        let access_token = settings.access_token.ok_or_else(|| {
            MedRagError::ConfigError(
                "Vertex backend requires an access token (set VERTEX_ACCESS_TOKEN)".to_string(),
            )
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            project_id,
            region: settings.region,
            access_token,
            model: settings.model,
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Set the model name (e.g. `text-embedding-004`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "https://{region}-aiplatform.googleapis.com/v1/projects/{project}/locations/{region}/publishers/google/models/{model}:predict",
            region = self.region,
            project = self.project_id,
            model = self.model,
        )
    }

    /// Embed one batch of at most [`MAX_BATCH`] texts.
    async fn embed_slice(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request_body = PredictRequest {
            instances: texts
                .iter()
                .map(|t| Instance { task_type: TASK_TYPE, content: t })
                .collect(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.access_token)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Vertex", error = %e, "request failed");
                MedRagError::BackendUnavailable {
                    provider: "Vertex".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            error!(provider = "Vertex", %status, "authentication rejected");
            return Err(MedRagError::BackendUnavailable {
                provider: "Vertex".into(),
                message: format!("authentication rejected ({status})"),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(provider = "Vertex", %status, "API error");
            return Err(MedRagError::EmbeddingError {
                provider: "Vertex".into(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let predict_response: PredictResponse = response.json().await.map_err(|e| {
            error!(provider = "Vertex", error = %e, "failed to parse response");
            MedRagError::EmbeddingError {
                provider: "Vertex".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if predict_response.predictions.len() != texts.len() {
            return Err(MedRagError::EmbeddingError {
                provider: "Vertex".into(),
                message: format!(
                    "expected {} predictions, got {}",
                    texts.len(),
                    predict_response.predictions.len()
                ),
            });
        }

        Ok(predict_response
            .predictions
            .into_iter()
            .map(|p| p.embeddings.values)
            .collect())
    }
}

// ── Vertex API request/response types ──────────────────────────────

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
}

#[derive(Serialize)]
struct Instance<'a> {
    task_type: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    embeddings: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for VertexEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "Vertex",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let mut rows = Vec::with_capacity(texts.len());
        for slice in texts.chunks(MAX_BATCH) {
            rows.extend(self.embed_slice(slice).await?);
        }
        Ok(rows)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
