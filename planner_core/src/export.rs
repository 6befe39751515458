//! CSV export for archiving the completion journal.
//!
//! The CSV is fsynced before the journal is renamed, so a crash in between
//! leaves a journal that can simply be exported again.

use crate::journal::CompletionEntry;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CsvRow {
    pub id: String,
    pub exercise_id: u32,
    pub exercise_name: String,
    pub weight_kg: f64,
    pub completed_at: String,
}

impl From<&CompletionEntry> for CsvRow {
    fn from(entry: &CompletionEntry) -> Self {
        CsvRow {
            id: entry.id.to_string(),
            exercise_id: entry.exercise_id,
            exercise_name: entry.exercise_name.clone(),
            weight_kg: entry.weight_kg,
            completed_at: entry.completed_at.to_rfc3339(),
        }
    }
}

/// Append journal entries to the CSV and archive the journal
///
/// Returns the number of entries exported. The journal is renamed to
/// `*.jsonl.processed` rather than deleted.
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let entries = crate::journal::read_entries(log_path)?;

    if entries.is_empty() {
        tracing::info!("No completions in journal to export");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for entry in &entries {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} completions to CSV", entries.len());

    let processed_path = log_path.with_extension("jsonl.processed");
    std::fs::rename(log_path, &processed_path)?;

    tracing::info!("Archived journal to {:?}", processed_path);

    Ok(entries.len())
}

/// Remove archived journals from a directory
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed journal: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journals", count);
    }

    Ok(count)
}
