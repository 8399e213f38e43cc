use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// One stored feedback row. `expected_output` carries the answer the user
/// endorsed, or their own suggestion when they disliked the reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub recorded_at: String,
    pub score_name: String,
    pub model: String,
    pub question: String,
    pub answer: String,
    pub user_liked: bool,
    pub expected_output: Option<String>,
    pub comment: Option<String>,
}

/// Append-only JSONL sink for user feedback. The mutex serializes appends so
/// concurrent submissions never interleave partial lines.
pub struct FeedbackLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn append(&self, record: &FeedbackRecord) -> anyhow::Result<()> {
        let mut line =
            serde_json::to_string(record).context("failed to serialize feedback record")?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| {
                format!("failed to open feedback log at {}", self.path.display())
            })?;
        file.write_all(line.as_bytes())
            .await
            .context("failed to append feedback record")?;
        Ok(())
    }
}
