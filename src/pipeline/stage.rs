//! PipelineStage trait and stage outcomes.

use async_trait::async_trait;

use crate::core::errors::StageError;

use super::context::QueryContext;
use super::ChatReply;

/// What a stage decided about the rest of the run.
#[derive(Debug, Clone)]
pub enum StageOutcome {
    /// Hand the context to the next stage.
    Continue,
    /// Stop the run with this reply; later stages do not execute.
    Finish(ChatReply),
}

/// One step of the query-processing pipeline.
///
/// Stages mutate the `QueryContext` in place and either pass control on or
/// finish the run early. Errors abort the whole invocation.
#[async_trait]
pub trait PipelineStage: Send + Sync {
    /// Stage name for logs and error reports.
    fn name(&self) -> &str;

    async fn execute(&self, ctx: &mut QueryContext) -> Result<StageOutcome, StageError>;
}
