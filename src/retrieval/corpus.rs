//! Corpus bootstrap: load QA pairs from CSV and populate the index.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::index::QaPoint;
use super::{Embedder, QaIndex, QaPair};

/// One CSV row of the support corpus. Questions are stored pre-cleaned,
/// in the same form the query normalizer produces.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusRow {
    pub question_clear: String,
    pub content_clear: String,
}

pub fn load_rows(path: &Path) -> anyhow::Result<Vec<CorpusRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open corpus file {}", path.display()))?;

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row: CorpusRow = row.context("Malformed corpus row")?;
        rows.push(row);
    }
    Ok(rows)
}

/// Make sure the index holds the corpus, loading it on first start.
///
/// When the collection already has points the CSV is not even opened, so
/// restarts stay cheap. Population embeds each row's question and writes
/// all points in one upsert; any embedding failure aborts the bootstrap.
pub async fn ensure_populated(
    index: &dyn QaIndex,
    embedder: &dyn Embedder,
    csv_path: &Path,
) -> anyhow::Result<()> {
    if index.is_populated().await {
        tracing::info!("QA collection already contains data");
        return Ok(());
    }

    tracing::info!("QA collection is empty, loading corpus from {}", csv_path.display());
    index.create().await.context("Failed to create the QA collection")?;

    let rows = load_rows(csv_path)?;
    let mut points = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        let vector = embedder
            .embed(&row.question_clear)
            .await
            .map_err(|e| anyhow::anyhow!("Embedding failed at corpus row {idx}: {e}"))?;

        points.push(QaPoint {
            id: idx as u64,
            vector,
            pair: QaPair::new(row.question_clear, row.content_clear),
        });

        if (idx + 1) % 100 == 0 {
            tracing::info!("Processed {} corpus rows", idx + 1);
        }
    }

    let total = points.len();
    index.upsert(points).await.context("Failed to upsert corpus points")?;
    tracing::info!("Corpus load completed, {} points upserted", total);
    Ok(())
}
