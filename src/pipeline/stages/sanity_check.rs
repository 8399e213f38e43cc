use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde_json::{json, Value};

use crate::core::errors::StageError;
use crate::llm::{ChatCompletion, CompletionRequest, PromptFormat};
use crate::pipeline::context::QueryContext;
use crate::pipeline::stage::{PipelineStage, StageOutcome};
use crate::retrieval::QaPair;

const STAGE: &str = "sanity_check";

/// How many prior user messages the classifier sees for context.
const HISTORY_WINDOW: usize = 2;

/// Asks the LLM to score each candidate as relevant (1) or not (0) and
/// keeps only the relevant ones.
///
/// Candidates are classified in fixed-size batches, all batches in flight
/// concurrently. Classification is deterministic (temperature 0) and the
/// output shape is pinned with guided JSON decoding.
pub struct SanityCheckStage {
    llm: Arc<dyn ChatCompletion>,
    format: Arc<dyn PromptFormat>,
    batch_size: usize,
}

impl SanityCheckStage {
    pub fn new(llm: Arc<dyn ChatCompletion>, format: Arc<dyn PromptFormat>, batch_size: usize) -> Self {
        Self {
            llm,
            format,
            batch_size: batch_size.max(1),
        }
    }

    async fn classify_batch(
        &self,
        query: &str,
        batch: &[QaPair],
        prior_user_messages: &[String],
    ) -> Result<Vec<QaPair>, StageError> {
        let messages = self
            .format
            .relevance_messages(query, batch, prior_user_messages);

        let request = CompletionRequest::new(messages)
            .with_temperature(0.0)
            .with_guided_json(json!({
                "type": "array",
                "items": { "type": "number", "enum": [0, 1] },
            }));

        let reply = self.llm.complete(request).await?;
        let flags = repair_length(parse_flags(&reply)?, batch.len());

        let kept: Vec<QaPair> = batch
            .iter()
            .zip(flags)
            .filter(|(_, flag)| *flag == 1)
            .map(|(pair, _)| pair.clone())
            .collect();

        tracing::info!("{} of {} pairs in batch judged relevant", kept.len(), batch.len());
        Ok(kept)
    }
}

/// Parse the classifier reply as a JSON array of 0/1 flags. Some backends
/// return the digits quoted, so strings are accepted too.
fn parse_flags(reply: &str) -> Result<Vec<i64>, StageError> {
    let parsed: Value = serde_json::from_str(reply.trim())
        .map_err(|e| StageError::malformed(STAGE, format!("expected a JSON array: {e}")))?;

    let items = parsed
        .as_array()
        .ok_or_else(|| StageError::malformed(STAGE, "classifier reply is not an array"))?;

    items
        .iter()
        .map(|item| {
            flag_value(item)
                .ok_or_else(|| StageError::malformed(STAGE, format!("unexpected array element: {item}")))
        })
        .collect()
}

fn flag_value(item: &Value) -> Option<i64> {
    if let Some(n) = item.as_i64() {
        return Some(n);
    }
    if let Some(f) = item.as_f64() {
        return Some(f as i64);
    }
    item.as_str().and_then(|s| s.trim().parse().ok())
}

/// Bring the flag list to the batch length: missing flags count as
/// irrelevant, extra flags are dropped.
fn repair_length(mut flags: Vec<i64>, expected: usize) -> Vec<i64> {
    if flags.len() < expected {
        tracing::warn!(
            "Classifier returned {} flags for a batch of {}, padding with zeros",
            flags.len(),
            expected
        );
        flags.resize(expected, 0);
    } else if flags.len() > expected {
        tracing::warn!(
            "Classifier returned {} flags for a batch of {}, truncating",
            flags.len(),
            expected
        );
        flags.truncate(expected);
    }
    flags
}

#[async_trait]
impl PipelineStage for SanityCheckStage {
    fn name(&self) -> &str {
        STAGE
    }

    async fn execute(&self, ctx: &mut QueryContext) -> Result<StageOutcome, StageError> {
        let prior = ctx.last_user_messages(HISTORY_WINDOW);
        let batches: Vec<&[QaPair]> = ctx.candidates.chunks(self.batch_size).collect();

        tracing::info!(
            "Checking {} candidates in {} batches",
            ctx.candidates.len(),
            batches.len()
        );

        let futures = batches
            .iter()
            .map(|batch| self.classify_batch(&ctx.cleaned_query, batch, &prior));
        let results = try_join_all(futures).await?;

        ctx.candidates = results.into_iter().flatten().collect();
        tracing::info!("{} candidates passed the relevance check", ctx.candidates.len());
        Ok(StageOutcome::Continue)
    }
}
