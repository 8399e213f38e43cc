use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::StageError;

const STAGE: &str = "embeddings";

/// Text embedding against an OpenAI-compatible `/embeddings` endpoint.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StageError>;
}

#[derive(Clone)]
pub struct HttpEmbedder {
    base_url: String,
    model: String,
    client: Client,
}

impl HttpEmbedder {
    /// `base_url` already includes the API prefix, e.g. `http://host:8001/v1`.
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StageError> {
        let url = format!("{}/embeddings", self.base_url);

        let body = json!({
            "model": self.model,
            "input": [text],
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StageError::failed(STAGE, e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(StageError::upstream(STAGE, status.as_u16(), text));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| StageError::failed(STAGE, e.to_string()))?;

        let vector: Vec<f32> = payload["data"][0]["embedding"]
            .as_array()
            .map(|vals| {
                vals.iter()
                    .filter_map(|v| v.as_f64().map(|f| f as f32))
                    .collect()
            })
            .unwrap_or_default();

        if vector.is_empty() {
            return Err(StageError::malformed(STAGE, "response carried no embedding"));
        }

        Ok(vector)
    }
}
