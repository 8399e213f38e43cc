use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::StageError;
use crate::pipeline::context::QueryContext;
use crate::pipeline::stage::{PipelineStage, StageOutcome};
use crate::text::QueryNormalizer;

/// Cleans the raw query into the form retrieval and prompting work with.
pub struct PreprocessStage {
    normalizer: Arc<QueryNormalizer>,
}

impl PreprocessStage {
    pub fn new(normalizer: Arc<QueryNormalizer>) -> Self {
        Self { normalizer }
    }
}

#[async_trait]
impl PipelineStage for PreprocessStage {
    fn name(&self) -> &str {
        "preprocess"
    }

    async fn execute(&self, ctx: &mut QueryContext) -> Result<StageOutcome, StageError> {
        ctx.cleaned_query = self.normalizer.normalize(&ctx.raw_query);
        tracing::debug!("Cleaned query: '{}'", ctx.cleaned_query);
        Ok(StageOutcome::Continue)
    }
}
