//! Batch collection: enumerate items, normalize each, keep source order.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{info, warn};

use crate::renaissance::{RenaissanceApi, RenaissanceApiError};
use crate::report::dom::TopsReportPage;
use crate::report::json::TopsReportJson;
use crate::report::{QuizRecord, normalize};
use crate::utils::log_if_slow;

/// Report fetches slower than this are logged.
const SLOW_FETCH: Duration = Duration::from_secs(5);

/// Normalize one saved report. Bodies starting with `{` or `[` are treated as
/// API payloads, anything else as an HTML page.
pub fn normalize_document(content: &str, title: &str) -> QuizRecord {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(payload) => normalize(&TopsReportJson::new(&payload), title),
            Err(e) => QuizRecord::failed(title, format!("invalid report JSON: {e}")),
        }
    } else {
        normalize(&TopsReportPage::parse(content), title)
    }
}

fn file_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Normalize saved report files in the order given. Unreadable files become
/// failed records; the batch always completes.
pub fn normalize_files(paths: &[PathBuf]) -> Vec<QuizRecord> {
    paths
        .iter()
        .map(|path| {
            let title = file_title(path);
            match std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))
            {
                Ok(content) => normalize_document(&content, &title),
                Err(e) => {
                    warn!(path = %path.display(), error = ?e, "Skipping unreadable report file");
                    QuizRecord::failed(title, format!("{e:#}"))
                }
            }
        })
        .collect()
}

/// Fetch and normalize every quiz in the student's inbox.
///
/// Listing failures abort the batch; a failed report fetch is recorded as a
/// failed item and the batch moves on. `delay` is slept between fetches.
pub async fn collect_reports(
    api: &RenaissanceApi,
    delay: Duration,
) -> Result<Vec<QuizRecord>, RenaissanceApiError> {
    let Some(school_year) = api.student_inbox().await? else {
        warn!("Inbox reports no current school year, nothing to collect");
        return Ok(Vec::new());
    };

    let items = api.inbox_items(&school_year).await?;
    let mut records = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let start = Instant::now();
        let result = api.tops_report(&item.activity_id).await;
        log_if_slow(start, SLOW_FETCH, &item.name);

        let record = match result {
            Ok(payload) => normalize(&TopsReportJson::new(&payload), &item.name),
            Err(e) => {
                warn!(
                    title = item.name.as_str(),
                    activity_id = item.activity_id.as_str(),
                    error = ?e,
                    "Failed to fetch TOPS report"
                );
                QuizRecord::failed(&item.name, e.to_string())
            }
        };
        records.push(record);
    }

    info!(
        total = records.len(),
        failed = records.iter().filter(|r| r.is_failed()).count(),
        "Collected TOPS reports"
    );
    Ok(records)
}

/// Serialize a batch as one JSON array. Non-ASCII text is written as-is.
pub fn render_batch(records: &[QuizRecord]) -> anyhow::Result<String> {
    serde_json::to_string(records).context("Failed to serialize quiz records")
}
