//! The query-processing pipeline.
//!
//! One invocation runs a fixed sequence of stages over a shared
//! `QueryContext`: preprocess, retrieve, deduplicate, sanity-check the
//! candidates, gate on having examples, then generate the reply. A stage
//! can finish the run early (the no-examples gate does), and the whole run
//! races a wall-clock timeout.

pub mod context;
pub mod stage;
pub mod stages;

use std::sync::Arc;
use std::time::Duration;

pub use crate::core::errors::StageError;
pub use context::QueryContext;
pub use stage::{PipelineStage, StageOutcome};
pub use stages::FALLBACK_MESSAGE;

use crate::llm::{ChatCompletion, ChatMessage, PromptFormat};
use crate::retrieval::{Embedder, QaIndex};
use crate::text::QueryNormalizer;

use stages::{
    DeduplicateStage, HasExamplesStage, PreprocessStage, ReplyStage, RetrieveStage,
    SanityCheckStage,
};

/// Final outcome of one pipeline invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    /// The cleaned form of the query, for the caller's history bookkeeping.
    pub cleaned_query: String,
}

/// Tunables for assembling a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub top_k: usize,
    pub relevance_batch_size: usize,
    pub reply_max_tokens: u32,
    pub reply_temperature: f64,
    pub timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_k: 20,
            relevance_batch_size: 10,
            reply_max_tokens: 512,
            reply_temperature: 0.5,
            timeout: Duration::from_secs(180),
        }
    }
}

/// Chains the stages and executes them sequentially under a deadline.
pub struct ChatPipeline {
    stages: Vec<Box<dyn PipelineStage>>,
    timeout: Duration,
}

impl ChatPipeline {
    pub fn new(
        normalizer: Arc<QueryNormalizer>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn QaIndex>,
        llm: Arc<dyn ChatCompletion>,
        format: Arc<dyn PromptFormat>,
        options: PipelineOptions,
    ) -> Self {
        let stages: Vec<Box<dyn PipelineStage>> = vec![
            Box::new(PreprocessStage::new(normalizer)),
            Box::new(RetrieveStage::new(embedder, index, options.top_k)),
            Box::new(DeduplicateStage),
            Box::new(SanityCheckStage::new(
                llm.clone(),
                format.clone(),
                options.relevance_batch_size,
            )),
            Box::new(HasExamplesStage),
            Box::new(ReplyStage::new(
                llm,
                format,
                options.reply_max_tokens,
                options.reply_temperature,
            )),
        ];

        Self {
            stages,
            timeout: options.timeout,
        }
    }

    /// Run one invocation. `history` is the cleaned conversation so far.
    pub async fn run(
        &self,
        raw_query: &str,
        history: Vec<ChatMessage>,
    ) -> Result<ChatReply, StageError> {
        let seconds = self.timeout.as_secs();
        match tokio::time::timeout(self.timeout, self.run_stages(raw_query, history)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Pipeline run exceeded its {}s budget", seconds);
                Err(StageError::Timeout { seconds })
            }
        }
    }

    async fn run_stages(
        &self,
        raw_query: &str,
        history: Vec<ChatMessage>,
    ) -> Result<ChatReply, StageError> {
        let mut ctx = QueryContext::new(raw_query, history);

        for stage in &self.stages {
            match stage.execute(&mut ctx).await {
                Ok(StageOutcome::Continue) => {
                    tracing::debug!("Stage '{}' completed", stage.name());
                }
                Ok(StageOutcome::Finish(reply)) => {
                    tracing::info!("Stage '{}' finished the run", stage.name());
                    return Ok(reply);
                }
                Err(e) => {
                    tracing::error!("Stage '{}' failed: {}", stage.name(), e);
                    return Err(e);
                }
            }
        }

        // The reply stage always finishes; reaching here means the stage
        // list was assembled wrong.
        Err(StageError::failed("pipeline", "no stage produced a reply"))
    }
}
