//! Chat-completion access and prompt construction.

mod client;
mod prompt;
mod types;

pub use client::{ChatCompletion, OpenAiCompatClient};
pub use prompt::{PromptFlavor, PromptFormat};
pub use types::{ChatMessage, CompletionRequest};
