use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::StageError;

use super::types::CompletionRequest;

const STAGE: &str = "chat";

/// Chat completion against any OpenAI-compatible server.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Run one completion and return the assistant message content.
    async fn complete(&self, request: CompletionRequest) -> Result<String, StageError>;
}

#[derive(Clone)]
pub struct OpenAiCompatClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl OpenAiCompatClient {
    /// `base_url` already includes the API prefix, e.g. `http://host:8000/v1`.
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenAiCompatClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, StageError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(n) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(n));
            }
            if let Some(schema) = request.guided_json {
                obj.insert("guided_json".to_string(), schema);
            }
        }

        let mut req = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let res = req
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

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(content)
    }
}
