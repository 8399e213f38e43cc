//! Per-invocation pipeline state.

use crate::llm::ChatMessage;
use crate::retrieval::QaPair;

/// Mutable state threaded through the pipeline stages.
///
/// The raw query and the cleaned history are fixed at construction; the
/// preprocess stage fills in `cleaned_query` and the retrieval stages
/// narrow `candidates` down to the examples the reply is grounded on.
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub raw_query: String,
    /// Prior turns with user messages in their cleaned form.
    pub history: Vec<ChatMessage>,
    pub cleaned_query: String,
    pub candidates: Vec<QaPair>,
}

impl QueryContext {
    pub fn new(raw_query: impl Into<String>, history: Vec<ChatMessage>) -> Self {
        Self {
            raw_query: raw_query.into(),
            history,
            cleaned_query: String::new(),
            candidates: Vec::new(),
        }
    }

    /// Contents of the last `n` user-authored history messages, oldest first.
    pub fn last_user_messages(&self, n: usize) -> Vec<String> {
        let user_contents: Vec<&str> = self
            .history
            .iter()
            .filter(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .collect();
        let start = user_contents.len().saturating_sub(n);
        user_contents[start..].iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_user_messages_skips_assistant_turns() {
        let ctx = QueryContext::new(
            "query",
            vec![
                ChatMessage::user("первый"),
                ChatMessage::assistant("ответ один"),
                ChatMessage::user("второй"),
                ChatMessage::assistant("ответ два"),
                ChatMessage::user("третий"),
            ],
        );
        assert_eq!(ctx.last_user_messages(2), ["второй", "третий"]);
    }

    #[test]
    fn last_user_messages_handles_short_history() {
        let ctx = QueryContext::new("query", vec![ChatMessage::user("единственный")]);
        assert_eq!(ctx.last_user_messages(2), ["единственный"]);

        let empty = QueryContext::new("query", Vec::new());
        assert!(empty.last_user_messages(2).is_empty());
    }
}
