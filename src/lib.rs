//! Backend for the Opora support assistant: a retrieval-augmented chat
//! service for HR questions. Incoming queries are normalized, matched
//! against a Qdrant index of question/answer pairs, filtered for relevance
//! by the language model and answered with the surviving pairs as examples.

pub mod core;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod retrieval;
pub mod server;
pub mod state;
pub mod text;
