//! Prompt packaging for the model families being served.
//!
//! Different chat templates want the same material in different places:
//! most models take a system message plus an examples block inside the user
//! message, Vikhr-style models take retrieved material in a dedicated
//! `documents` role, and Gemma takes everything folded into a single user
//! turn because its template has no system role. The flavor is a deployment
//! property, so it is selected in the config next to the model name rather
//! than guessed from the name itself.

use serde::{Deserialize, Serialize};

use crate::retrieval::QaPair;

use super::types::ChatMessage;

const RELEVANCE_SYSTEM_PROMPT: &str = "Твоя задача - определить, релевантны ли предоставленные документы запросу пользователя. \
Релевантым считай тот документ, в котором тема хотя бы смежно связана с запросом. \
Верни ровно один массив из строк '0' или '1', где '1' означает, что документ релевантен запросу, \
а '0' - что нерелевантен. Массив должен иметь ровно столько элементов, сколько документов в запросе.";

const REPLY_SYSTEM_PROMPT: &str = "Ты помощник, который дает ответы на основе предоставленных примеров вопросов и ответов. \
Используй предоставленные вопросы и ответы как образец стиля и уровня детализации. \
Обращай внимание на прошлые сообщения для ответа на запрос пользователя. \
Не задавай уточняющих вопросов. \
Если примеры вопросов и ответов не содержат релевантной для запроса информации, \
не придумывай ответ, а дай знать пользователю.";

/// How prompts are laid out for the configured model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptFlavor {
    /// System message, history, then examples inside the user message.
    Standard,
    /// Retrieved material in a dedicated `documents` role (Vikhr).
    DocumentsRole,
    /// Everything folded into user turns, no system role (Gemma).
    SingleTurn,
}

impl PromptFlavor {
    pub fn format(&self) -> Box<dyn PromptFormat> {
        match self {
            PromptFlavor::Standard => Box::new(StandardFormat),
            PromptFlavor::DocumentsRole => Box::new(DocumentsRoleFormat),
            PromptFlavor::SingleTurn => Box::new(SingleTurnFormat),
        }
    }
}

/// Builds the message sequences for the two LLM calls the pipeline makes.
pub trait PromptFormat: Send + Sync {
    /// Messages asking the model to score each candidate document 0/1.
    fn relevance_messages(
        &self,
        query: &str,
        batch: &[QaPair],
        prior_user_messages: &[String],
    ) -> Vec<ChatMessage>;

    /// Messages asking the model to answer from the surviving examples.
    fn reply_messages(
        &self,
        query: &str,
        examples: &[QaPair],
        history: &[ChatMessage],
    ) -> Vec<ChatMessage>;
}

pub struct StandardFormat;
pub struct DocumentsRoleFormat;
pub struct SingleTurnFormat;

// ---------------------------------------------------------------------------
// Shared building blocks
// ---------------------------------------------------------------------------

fn relevance_instruction(query: &str, prior_user_messages: &[String], batch_len: usize) -> String {
    let previous = prior_user_messages.join(", ");
    format!(
        "Прошлые сообщения пользователя: '{previous}'. Запрос пользователя: '{query}'. \
Оцени релевантность каждого документа к этому запросу с учетом контекста \
и верни массив из {batch_len} элементов, где каждый элемент - '0' или '1'."
    )
}

fn numbered_documents(batch: &[QaPair]) -> String {
    let mut out = String::new();
    for (idx, pair) in batch.iter().enumerate() {
        out.push_str(&format!(
            "Документ {idx}:\nВопрос: {}\nОтвет: {}\n\n",
            pair.question, pair.answer
        ));
    }
    out
}

fn numbered_examples(examples: &[QaPair]) -> String {
    let mut out = String::new();
    for (idx, pair) in examples.iter().enumerate() {
        out.push_str(&format!(
            "Пример {}:\nВопрос: {}\nОтвет: {}\n\n",
            idx + 1,
            pair.question,
            pair.answer
        ));
    }
    out
}

#[derive(Serialize)]
struct RelevanceDocument<'a> {
    doc_id: usize,
    title: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ReplyDocument<'a> {
    doc_id: usize,
    question: &'a str,
    answer: &'a str,
}

fn relevance_documents_json(batch: &[QaPair]) -> String {
    let documents: Vec<RelevanceDocument> = batch
        .iter()
        .enumerate()
        .map(|(idx, pair)| RelevanceDocument {
            doc_id: idx,
            title: &pair.question,
            content: &pair.answer,
        })
        .collect();
    serde_json::to_string(&documents).unwrap_or_default()
}

fn reply_documents_json(examples: &[QaPair]) -> String {
    let documents: Vec<ReplyDocument> = examples
        .iter()
        .enumerate()
        .map(|(idx, pair)| ReplyDocument {
            doc_id: idx,
            question: &pair.question,
            answer: &pair.answer,
        })
        .collect();
    serde_json::to_string(&documents).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Standard
// ---------------------------------------------------------------------------

impl PromptFormat for StandardFormat {
    fn relevance_messages(
        &self,
        query: &str,
        batch: &[QaPair],
        prior_user_messages: &[String],
    ) -> Vec<ChatMessage> {
        let user_content = format!(
            "Документы:\n{}\n\n{}",
            numbered_documents(batch),
            relevance_instruction(query, prior_user_messages, batch.len())
        );
        vec![
            ChatMessage::system(RELEVANCE_SYSTEM_PROMPT),
            ChatMessage::user(user_content),
        ]
    }

    fn reply_messages(
        &self,
        query: &str,
        examples: &[QaPair],
        history: &[ChatMessage],
    ) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(REPLY_SYSTEM_PROMPT)];
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(format!(
            "Примеры вопросов и ответов:\n{}\n\nЗапрос пользователя: {}",
            numbered_examples(examples),
            query
        )));
        messages
    }
}

// ---------------------------------------------------------------------------
// Documents role
// ---------------------------------------------------------------------------

impl PromptFormat for DocumentsRoleFormat {
    fn relevance_messages(
        &self,
        query: &str,
        batch: &[QaPair],
        prior_user_messages: &[String],
    ) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(RELEVANCE_SYSTEM_PROMPT),
            ChatMessage::new("documents", relevance_documents_json(batch)),
            ChatMessage::user(relevance_instruction(query, prior_user_messages, batch.len())),
        ]
    }

    fn reply_messages(
        &self,
        query: &str,
        examples: &[QaPair],
        history: &[ChatMessage],
    ) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(REPLY_SYSTEM_PROMPT)];
        messages.extend_from_slice(history);
        messages.push(ChatMessage::new("documents", reply_documents_json(examples)));
        messages.push(ChatMessage::user(query));
        messages
    }
}

// ---------------------------------------------------------------------------
// Single turn
// ---------------------------------------------------------------------------

impl PromptFormat for SingleTurnFormat {
    fn relevance_messages(
        &self,
        query: &str,
        batch: &[QaPair],
        prior_user_messages: &[String],
    ) -> Vec<ChatMessage> {
        let content = format!(
            "{RELEVANCE_SYSTEM_PROMPT}\n\nДокументы:\n{}\n\n{}",
            numbered_documents(batch),
            relevance_instruction(query, prior_user_messages, batch.len())
        );
        vec![ChatMessage::user(content)]
    }

    fn reply_messages(
        &self,
        query: &str,
        examples: &[QaPair],
        history: &[ChatMessage],
    ) -> Vec<ChatMessage> {
        let mut messages = history.to_vec();
        messages.push(ChatMessage::user(format!(
            "Примеры вопросов и ответов:\n{}\n\nЗапрос пользователя: {}",
            numbered_examples(examples),
            query
        )));
        // No system role: the instruction rides on the opening message.
        if let Some(first) = messages.first_mut() {
            first.content = format!("{REPLY_SYSTEM_PROMPT}\n\n{}", first.content);
        }
        messages
    }
}
