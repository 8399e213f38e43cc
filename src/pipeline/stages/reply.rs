use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::StageError;
use crate::llm::{ChatCompletion, CompletionRequest, PromptFormat};
use crate::pipeline::context::QueryContext;
use crate::pipeline::stage::{PipelineStage, StageOutcome};
use crate::pipeline::ChatReply;

/// Generates the final answer from the surviving examples and the cleaned
/// conversation history.
pub struct ReplyStage {
    llm: Arc<dyn ChatCompletion>,
    format: Arc<dyn PromptFormat>,
    max_tokens: u32,
    temperature: f64,
}

impl ReplyStage {
    pub fn new(
        llm: Arc<dyn ChatCompletion>,
        format: Arc<dyn PromptFormat>,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            llm,
            format,
            max_tokens,
            temperature,
        }
    }
}

#[async_trait]
impl PipelineStage for ReplyStage {
    fn name(&self) -> &str {
        "reply"
    }

    async fn execute(&self, ctx: &mut QueryContext) -> Result<StageOutcome, StageError> {
        let messages = self
            .format
            .reply_messages(&ctx.cleaned_query, &ctx.candidates, &ctx.history);

        tracing::info!("Sending {} messages for reply generation", messages.len());

        let request = CompletionRequest::new(messages)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let response = self.llm.complete(request).await?;
        tracing::info!("Generated a reply of {} characters", response.chars().count());

        Ok(StageOutcome::Finish(ChatReply {
            response,
            cleaned_query: ctx.cleaned_query.clone(),
        }))
    }
}
