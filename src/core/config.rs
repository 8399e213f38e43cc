//! Typed application settings.
//!
//! Settings load from a YAML file (`OPORA_CONFIG_PATH`, falling back to
//! `./config.yml`) with serde defaults for every field, so a partial file
//! or no file at all still yields a usable configuration. The LLM API key
//! can be injected through `OPORA_LLM_API_KEY` to keep secrets out of the
//! file.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::llm::PromptFlavor;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "OPORA_CONFIG_PATH";

/// Environment variable that overrides `llm.api_key`.
pub const LLM_API_KEY_ENV: &str = "OPORA_LLM_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub qdrant: QdrantSettings,
    pub pipeline: PipelineSettings,
    pub corpus: CorpusSettings,
    pub feedback: FeedbackSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Extra CORS origins; the local development origins are always used
    /// when this list is empty.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of an OpenAI-compatible chat completion server.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// How prompts are packaged for the model family being served.
    pub prompt_flavor: PromptFlavor,
    pub reply_max_tokens: u32,
    pub reply_temperature: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/v1".to_string(),
            api_key: String::new(),
            model: "Vikhrmodels/Vikhr-Nemo-12B-Instruct-R-21-09-24".to_string(),
            prompt_flavor: PromptFlavor::DocumentsRole,
            reply_max_tokens: 512,
            reply_temperature: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Base URL of an OpenAI-compatible embeddings server.
    pub base_url: String,
    pub model: String,
    /// Vector width produced by the embedding model.
    pub dimension: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001/v1".to_string(),
            model: "intfloat/multilingual-e5-base".to_string(),
            dimension: 768,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantSettings {
    pub url: String,
    pub collection: String,
    /// How many nearest neighbours a retrieval pass asks for.
    pub top_k: usize,
}

impl Default for QdrantSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: "qa_pairs".to_string(),
            top_k: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Wall-clock budget for one full pipeline run, in seconds.
    pub timeout_secs: u64,
    /// Candidate pairs per relevance-classification request.
    pub relevance_batch_size: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 180,
            relevance_batch_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    /// CSV file with `question_clear`/`content_clear` columns.
    pub csv_path: String,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            csv_path: "data/qa_pairs.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackSettings {
    /// JSONL file the feedback endpoint appends to.
    pub path: String,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            path: "data/feedback.jsonl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the config file, then apply environment overrides.
    ///
    /// A missing file is not an error; an unreadable or syntactically
    /// invalid one is.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();
        let mut settings = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        } else {
            Settings::default()
        };

        if let Ok(key) = env::var(LLM_API_KEY_ENV) {
            settings.llm.api_key = key;
        }

        Ok(settings)
    }
}

/// Resolve the config file location.
pub fn config_path() -> PathBuf {
    match env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from("config.yml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.embedding.dimension, 768);
        assert_eq!(settings.qdrant.collection, "qa_pairs");
        assert_eq!(settings.pipeline.timeout_secs, 180);
        assert_eq!(settings.pipeline.relevance_batch_size, 10);
        assert_eq!(settings.llm.reply_max_tokens, 512);
        assert_eq!(settings.llm.prompt_flavor, PromptFlavor::DocumentsRole);
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_the_rest() {
        let yaml = r#"
server:
  port: 9000
llm:
  model: google/gemma-2-9b-it
  prompt_flavor: single_turn
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.llm.model, "google/gemma-2-9b-it");
        assert_eq!(settings.llm.prompt_flavor, PromptFlavor::SingleTurn);
        assert_eq!(settings.llm.reply_temperature, 0.5);
        assert_eq!(settings.qdrant.top_k, 20);
    }

    #[test]
    fn empty_yaml_is_all_defaults() {
        let settings: Settings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings.corpus.csv_path, "data/qa_pairs.csv");
        assert_eq!(settings.feedback.path, "data/feedback.jsonl");
        assert_eq!(settings.logging.dir, "logs");
    }
}
