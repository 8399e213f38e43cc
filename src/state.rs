use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::core::config::Settings;
use crate::llm::OpenAiCompatClient;
use crate::pipeline::{ChatPipeline, PipelineOptions};
use crate::retrieval::{corpus, HttpEmbedder, QdrantQaIndex};
use crate::server::feedback::FeedbackLog;
use crate::text::QueryNormalizer;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to build the query normalizer: {0}")]
    Normalizer(#[source] anyhow::Error),

    #[error("Failed to connect to the vector index: {0}")]
    Index(#[source] anyhow::Error),

    #[error("Failed to bootstrap the QA corpus: {0}")]
    Corpus(#[source] anyhow::Error),
}

/// Global application state shared across all routes.
///
/// Contains references to:
/// - Configuration
/// - The assembled chat pipeline
/// - The feedback sink
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub pipeline: Arc<ChatPipeline>,
    pub feedback: Arc<FeedbackLog>,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// This process includes:
    /// 1. Building the query normalizer (masking, glossary, stopword filter)
    /// 2. Connecting the embedding client and the Qdrant index, loading the
    ///    QA corpus into the index when it is empty
    /// 3. Wiring the chat completion client and prompt format into the
    ///    pipeline
    pub async fn initialize(settings: Settings) -> Result<Arc<Self>, InitializationError> {
        let settings = Arc::new(settings);

        let normalizer =
            Arc::new(QueryNormalizer::new().map_err(InitializationError::Normalizer)?);

        let embedder = Arc::new(HttpEmbedder::new(
            settings.embedding.base_url.clone(),
            settings.embedding.model.clone(),
        ));

        let index = Arc::new(
            QdrantQaIndex::connect(
                &settings.qdrant.url,
                settings.qdrant.collection.clone(),
                settings.embedding.dimension,
            )
            .map_err(InitializationError::Index)?,
        );

        corpus::ensure_populated(
            index.as_ref(),
            embedder.as_ref(),
            Path::new(&settings.corpus.csv_path),
        )
        .await
        .map_err(InitializationError::Corpus)?;

        let llm = Arc::new(OpenAiCompatClient::new(
            settings.llm.base_url.clone(),
            settings.llm.api_key.clone(),
            settings.llm.model.clone(),
        ));

        let format = Arc::from(settings.llm.prompt_flavor.format());

        let options = PipelineOptions {
            top_k: settings.qdrant.top_k,
            relevance_batch_size: settings.pipeline.relevance_batch_size,
            reply_max_tokens: settings.llm.reply_max_tokens,
            reply_temperature: settings.llm.reply_temperature,
            timeout: Duration::from_secs(settings.pipeline.timeout_secs),
        };

        let pipeline = Arc::new(ChatPipeline::new(
            normalizer, embedder, index, llm, format, options,
        ));

        let feedback = Arc::new(FeedbackLog::new(&settings.feedback.path));

        Ok(Arc::new(Self {
            settings,
            pipeline,
            feedback,
        }))
    }
}
