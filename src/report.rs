// Report module: turns the opaque JSON documents returned by the API into
// the short human-readable summaries the CLI prints, and saves full crawl
// results to disk. Nothing here validates the shape of a response; keys
// that are missing are shown as `N/A` or skipped.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Number of characters kept by [`text_preview`].
pub const PREVIEW_CHARS: usize = 200;

/// How many section titles [`crawl_summary`] lists.
pub const LISTED_SECTIONS: usize = 3;

const NOT_AVAILABLE: &str = "N/A";

/// First [`PREVIEW_CHARS`] characters of `text` followed by `...`, or the
/// text itself when it is short enough.
pub fn text_preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Render a scalar for display: strings without quotes, anything else as
/// JSON, absent values as `N/A`.
fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => NOT_AVAILABLE.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Summary lines for a crawl result.
pub fn crawl_summary(result: &Value) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(data) = result.get("data") {
        if let Some(text) = data.get("text").and_then(Value::as_str) {
            lines.push(format!("Text Preview: {}", text_preview(text)));
        }
        if let Some(sections) = data.get("sections").and_then(Value::as_array) {
            if !sections.is_empty() {
                lines.push(format!("Sections Found: {}", sections.len()));
                for (i, section) in sections.iter().take(LISTED_SECTIONS).enumerate() {
                    let title = section
                        .get("title")
                        .and_then(Value::as_str)
                        .unwrap_or("Untitled");
                    lines.push(format!("  {}. {}", i + 1, title));
                }
            }
        }
    }

    if let Some(metadata) = result.get("metadata") {
        lines.push(format!("Final URL: {}", display_value(metadata.get("finalUrl"))));
        lines.push(format!("Load Time: {}ms", display_value(metadata.get("loadTime"))));
        lines.push(format!(
            "Content Length: {} bytes",
            display_value(metadata.get("contentLength"))
        ));
    }

    lines
}

/// Summary lines for a history document: job count and the latest job.
pub fn history_summary(history: &Value) -> Vec<String> {
    let Some(jobs) = history.get("jobs").and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut lines = vec![format!("Total crawl jobs: {}", jobs.len())];
    if let Some(latest) = jobs.first() {
        lines.push(format!("Latest Job ID: {}", display_value(latest.get("job_id"))));
        lines.push(format!("Created: {}", display_value(latest.get("created_at"))));
    }
    lines
}

/// Write `result` to `<dir>/<prefix>_<timestamp>.json` as indented UTF-8
/// JSON and return the path.
pub fn save_result(result: &Value, dir: &Path, prefix: &str, timestamp: i64) -> Result<PathBuf> {
    let path = dir.join(format!("{}_{}.json", prefix, timestamp));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result).context("Failed to serialize crawl result")?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
