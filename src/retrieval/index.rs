//! Qdrant-backed QA index.
//!
//! Points carry the corpus question and answer as string payload fields
//! (`question_clear`, `content_clear`); vectors are cosine-compared. The
//! trait keeps the pipeline testable without a running Qdrant.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    value::Kind, CreateCollectionBuilder, Distance, PointStruct, QueryPointsBuilder, ScoredPoint,
    UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;

use super::QaPair;

/// A vector-indexed corpus of QA pairs.
#[async_trait]
pub trait QaIndex: Send + Sync {
    /// True when the collection exists and holds at least one point. Any
    /// lookup failure reads as "not populated".
    async fn is_populated(&self) -> bool;

    /// Create the collection for this index's vector size.
    async fn create(&self) -> anyhow::Result<()>;

    /// Insert or overwrite points, waiting for the write to land.
    async fn upsert(&self, points: Vec<QaPoint>) -> anyhow::Result<()>;

    /// Nearest neighbours of `vector`, best match first.
    async fn query(&self, vector: Vec<f32>, top_k: usize) -> anyhow::Result<Vec<ScoredQaPair>>;
}

/// One point ready for upsert.
#[derive(Debug, Clone)]
pub struct QaPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub pair: QaPair,
}

/// A retrieved pair with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredQaPair {
    pub pair: QaPair,
    pub score: f32,
}

pub struct QdrantQaIndex {
    client: Qdrant,
    collection: String,
    vector_size: u64,
}

impl QdrantQaIndex {
    pub fn connect(url: &str, collection: String, vector_size: u64) -> anyhow::Result<Self> {
        let client = Qdrant::from_url(url).build()?;
        Ok(Self {
            client,
            collection,
            vector_size,
        })
    }
}

#[async_trait]
impl QaIndex for QdrantQaIndex {
    async fn is_populated(&self) -> bool {
        match self.client.collection_info(self.collection.as_str()).await {
            Ok(info) => {
                let points = info.result.and_then(|c| c.points_count).unwrap_or(0);
                tracing::info!("Collection '{}' holds {} points", self.collection, points);
                points > 0
            }
            Err(err) => {
                tracing::warn!("Collection check for '{}' failed: {}", self.collection, err);
                false
            }
        }
    }

    async fn create(&self) -> anyhow::Result<()> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(self.collection.as_str()).vectors_config(
                    VectorParamsBuilder::new(self.vector_size, Distance::Cosine),
                ),
            )
            .await?;
        tracing::info!(
            "Created collection '{}' ({}-dimensional, cosine)",
            self.collection,
            self.vector_size
        );
        Ok(())
    }

    async fn upsert(&self, points: Vec<QaPoint>) -> anyhow::Result<()> {
        let points: Vec<PointStruct> = points
            .into_iter()
            .map(point_struct)
            .collect::<anyhow::Result<_>>()?;

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(self.collection.as_str(), points)
                    .wait(true)
                    .build(),
            )
            .await?;
        Ok(())
    }

    async fn query(&self, vector: Vec<f32>, top_k: usize) -> anyhow::Result<Vec<ScoredQaPair>> {
        let response = self
            .client
            .query(
                QueryPointsBuilder::new(self.collection.as_str())
                    .query(vector)
                    .limit(top_k as u64)
                    .with_payload(true),
            )
            .await?;

        Ok(response.result.into_iter().filter_map(scored_pair).collect())
    }
}

fn point_struct(point: QaPoint) -> anyhow::Result<PointStruct> {
    let payload = Payload::try_from(json!({
        "question_clear": point.pair.question,
        "content_clear": point.pair.answer,
    }))
    .map_err(|e| anyhow::anyhow!("invalid point payload: {e}"))?;

    Ok(PointStruct::new(point.id, point.vector, payload))
}

fn scored_pair(point: ScoredPoint) -> Option<ScoredQaPair> {
    let question = payload_str(&point.payload, "question_clear");
    let answer = payload_str(&point.payload, "content_clear");
    match (question, answer) {
        (Some(question), Some(answer)) => Some(ScoredQaPair {
            pair: QaPair { question, answer },
            score: point.score,
        }),
        _ => {
            tracing::debug!("Dropping a retrieved point without QA payload");
            None
        }
    }
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
    match payload.get(key)?.kind.as_ref()? {
        Kind::StringValue(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_value(s: &str) -> Value {
        Value {
            kind: Some(Kind::StringValue(s.to_string())),
        }
    }

    #[test]
    fn scored_pair_maps_the_payload_fields() {
        let mut payload = HashMap::new();
        payload.insert("question_clear".to_string(), string_value("оформить отпуск"));
        payload.insert("content_clear".to_string(), string_value("Подайте заявление."));

        let point = ScoredPoint {
            payload,
            score: 0.87,
            ..Default::default()
        };

        let scored = scored_pair(point).unwrap();
        assert_eq!(scored.pair.question, "оформить отпуск");
        assert_eq!(scored.pair.answer, "Подайте заявление.");
        assert!((scored.score - 0.87).abs() < f32::EPSILON);
    }

    #[test]
    fn scored_pair_drops_points_without_qa_payload() {
        let point = ScoredPoint {
            payload: HashMap::new(),
            score: 0.5,
            ..Default::default()
        };
        assert!(scored_pair(point).is_none());
    }

    #[test]
    fn point_struct_keeps_the_corpus_field_names() {
        let point = QaPoint {
            id: 7,
            vector: vec![0.1, 0.2],
            pair: QaPair::new("вопрос", "ответ"),
        };
        let built = point_struct(point).unwrap();
        assert!(built.payload.contains_key("question_clear"));
        assert!(built.payload.contains_key("content_clear"));
    }
}
