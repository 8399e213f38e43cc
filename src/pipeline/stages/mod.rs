//! The individual pipeline stages, in their execution order.

mod deduplicate;
mod has_examples;
mod preprocess;
mod reply;
mod retrieve;
mod sanity_check;

pub use deduplicate::DeduplicateStage;
pub use has_examples::{HasExamplesStage, FALLBACK_MESSAGE};
pub use preprocess::PreprocessStage;
pub use reply::ReplyStage;
pub use retrieve::RetrieveStage;
pub use sanity_check::SanityCheckStage;
