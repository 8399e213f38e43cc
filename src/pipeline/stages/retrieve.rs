use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::StageError;
use crate::pipeline::context::QueryContext;
use crate::pipeline::stage::{PipelineStage, StageOutcome};
use crate::retrieval::{Embedder, QaIndex};

/// How many prior user messages ride along with the query embedding.
const HISTORY_WINDOW: usize = 2;

/// Embeds the cleaned query (with recent history) and pulls the nearest
/// corpus pairs from the index.
pub struct RetrieveStage {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn QaIndex>,
    top_k: usize,
}

impl RetrieveStage {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn QaIndex>, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }
}

/// Recent cleaned user messages plus the current query, one per line,
/// history first.
fn contextual_query(ctx: &QueryContext) -> String {
    let mut parts = ctx.last_user_messages(HISTORY_WINDOW);
    parts.push(ctx.cleaned_query.clone());
    parts.join("\n")
}

#[async_trait]
impl PipelineStage for RetrieveStage {
    fn name(&self) -> &str {
        "retrieve"
    }

    async fn execute(&self, ctx: &mut QueryContext) -> Result<StageOutcome, StageError> {
        let query = contextual_query(ctx);
        let vector = self.embedder.embed(&query).await?;

        let scored = self
            .index
            .query(vector, self.top_k)
            .await
            .map_err(|e| StageError::failed(self.name(), e.to_string()))?;

        tracing::info!("Retrieved {} candidate pairs", scored.len());
        ctx.candidates = scored.into_iter().map(|s| s.pair).collect();
        Ok(StageOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::llm::ChatMessage;
    use crate::retrieval::{QaPair, QaPoint, ScoredQaPair};

    /// Embedder double that records the text it was given.
    struct RecordingEmbedder {
        texts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Embedder for RecordingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, StageError> {
            self.texts.lock().unwrap().push(text.to_string());
            Ok(vec![1.0, 0.0])
        }
    }

    /// Index double returning a fixed result set.
    struct CannedIndex {
        results: Vec<ScoredQaPair>,
    }

    #[async_trait]
    impl QaIndex for CannedIndex {
        async fn is_populated(&self) -> bool {
            true
        }

        async fn create(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn upsert(&self, _points: Vec<QaPoint>) -> anyhow::Result<()> {
            Ok(())
        }

        async fn query(&self, _vector: Vec<f32>, top_k: usize) -> anyhow::Result<Vec<ScoredQaPair>> {
            Ok(self.results.iter().take(top_k).cloned().collect())
        }
    }

    fn scored(question: &str, answer: &str, score: f32) -> ScoredQaPair {
        ScoredQaPair {
            pair: QaPair::new(question, answer),
            score,
        }
    }

    #[tokio::test]
    async fn embeds_history_and_query_together() {
        let embedder = Arc::new(RecordingEmbedder {
            texts: Mutex::new(Vec::new()),
        });
        let index = Arc::new(CannedIndex { results: vec![] });
        let stage = RetrieveStage::new(embedder.clone(), index, 10);

        let mut ctx = QueryContext::new(
            "raw",
            vec![
                ChatMessage::user("первый вопрос"),
                ChatMessage::assistant("ответ"),
                ChatMessage::user("второй вопрос"),
                ChatMessage::user("третий вопрос"),
            ],
        );
        ctx.cleaned_query = "текущий запрос".to_string();

        stage.execute(&mut ctx).await.unwrap();

        let texts = embedder.texts.lock().unwrap();
        assert_eq!(texts.as_slice(), ["второй вопрос\nтретий вопрос\nтекущий запрос"]);
    }

    #[tokio::test]
    async fn a_fresh_conversation_embeds_the_query_alone() {
        let embedder = Arc::new(RecordingEmbedder {
            texts: Mutex::new(Vec::new()),
        });
        let index = Arc::new(CannedIndex { results: vec![] });
        let stage = RetrieveStage::new(embedder.clone(), index, 10);

        let mut ctx = QueryContext::new("raw", Vec::new());
        ctx.cleaned_query = "оформить отпуск".to_string();

        stage.execute(&mut ctx).await.unwrap();

        let texts = embedder.texts.lock().unwrap();
        assert_eq!(texts.as_slice(), ["оформить отпуск"]);
    }

    #[tokio::test]
    async fn candidates_keep_the_index_order() {
        let embedder = Arc::new(RecordingEmbedder {
            texts: Mutex::new(Vec::new()),
        });
        let index = Arc::new(CannedIndex {
            results: vec![
                scored("первый", "A", 0.92),
                scored("второй", "B", 0.85),
                scored("третий", "C", 0.41),
            ],
        });
        let stage = RetrieveStage::new(embedder, index, 2);

        let mut ctx = QueryContext::new("raw", Vec::new());
        ctx.cleaned_query = "запрос".to_string();

        stage.execute(&mut ctx).await.unwrap();

        assert_eq!(
            ctx.candidates,
            vec![QaPair::new("первый", "A"), QaPair::new("второй", "B")]
        );
    }
}
