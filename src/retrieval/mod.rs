//! Vector retrieval: embeddings, the QA index, and corpus bootstrap.

pub mod corpus;
mod embedder;
mod index;

pub use embedder::{Embedder, HttpEmbedder};
pub use index::{QaIndex, QaPoint, QdrantQaIndex, ScoredQaPair};

use serde::{Deserialize, Serialize};

/// One question-answer exemplar from the support corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}
