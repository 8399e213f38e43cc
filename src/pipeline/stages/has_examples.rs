use async_trait::async_trait;

use crate::core::errors::StageError;
use crate::pipeline::context::QueryContext;
use crate::pipeline::stage::{PipelineStage, StageOutcome};
use crate::pipeline::ChatReply;

/// The handoff message returned when no relevant examples survive.
pub const FALLBACK_MESSAGE: &str = "К сожалению, у меня недостаточно информации, чтобы ответить на ваш запрос. Переключаю на оператора...";

/// Gate before generation: with no relevant examples left, answering would
/// mean inventing one, so the run finishes with the operator handoff
/// instead of calling the model.
pub struct HasExamplesStage;

#[async_trait]
impl PipelineStage for HasExamplesStage {
    fn name(&self) -> &str {
        "has_examples"
    }

    async fn execute(&self, ctx: &mut QueryContext) -> Result<StageOutcome, StageError> {
        if ctx.candidates.is_empty() {
            tracing::warn!("No relevant QA examples survived, replying with the handoff message");
            return Ok(StageOutcome::Finish(ChatReply {
                response: FALLBACK_MESSAGE.to_string(),
                cleaned_query: ctx.cleaned_query.clone(),
            }));
        }

        tracing::info!("{} QA examples available for generation", ctx.candidates.len());
        Ok(StageOutcome::Continue)
    }
}
