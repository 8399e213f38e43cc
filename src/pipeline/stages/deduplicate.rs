use std::collections::HashSet;

use async_trait::async_trait;

use crate::core::errors::StageError;
use crate::pipeline::context::QueryContext;
use crate::pipeline::stage::{PipelineStage, StageOutcome};

/// Drops candidates whose answer text was already seen, keeping the first
/// (best-scored) occurrence. The corpus maps many question phrasings to one
/// canonical answer, so near-duplicate retrievals are common.
pub struct DeduplicateStage;

#[async_trait]
impl PipelineStage for DeduplicateStage {
    fn name(&self) -> &str {
        "deduplicate"
    }

    async fn execute(&self, ctx: &mut QueryContext) -> Result<StageOutcome, StageError> {
        let before = ctx.candidates.len();
        let mut seen = HashSet::new();
        ctx.candidates.retain(|pair| seen.insert(pair.answer.clone()));

        tracing::info!(
            "Deduplication kept {} of {} candidate pairs",
            ctx.candidates.len(),
            before
        );
        Ok(StageOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::QaPair;

    async fn run(candidates: Vec<QaPair>) -> Vec<QaPair> {
        let mut ctx = QueryContext::new("запрос", Vec::new());
        ctx.candidates = candidates;
        DeduplicateStage.execute(&mut ctx).await.unwrap();
        ctx.candidates
    }

    #[tokio::test]
    async fn keeps_the_first_occurrence_of_each_answer() {
        let result = run(vec![
            QaPair::new("оформить отпуск", "Ответ про отпуск"),
            QaPair::new("как взять отпуск", "Ответ про отпуск"),
            QaPair::new("получить справку", "Ответ про справку"),
            QaPair::new("взять отпуск летом", "Ответ про отпуск"),
        ])
        .await;

        assert_eq!(
            result,
            vec![
                QaPair::new("оформить отпуск", "Ответ про отпуск"),
                QaPair::new("получить справку", "Ответ про справку"),
            ]
        );
    }

    #[tokio::test]
    async fn same_question_with_different_answers_survives() {
        let result = run(vec![
            QaPair::new("вопрос", "первый ответ"),
            QaPair::new("вопрос", "второй ответ"),
        ])
        .await;

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn distinct_answers_pass_through_unchanged() {
        let input = vec![
            QaPair::new("a", "ответ один"),
            QaPair::new("b", "ответ два"),
            QaPair::new("c", "ответ три"),
        ];
        assert_eq!(run(input.clone()).await, input);
    }

    #[tokio::test]
    async fn empty_input_stays_empty() {
        assert!(run(Vec::new()).await.is_empty());
    }
}
