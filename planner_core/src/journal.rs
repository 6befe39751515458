//! Append-only completion journal.
//!
//! Each applied completion is appended as one JSON line, with file locking
//! so concurrent writers cannot interleave partial lines. The journal is the
//! cross-session source of best loads (see [`crate::history`]).

use crate::Result;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One completed exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletionEntry {
    pub id: Uuid,
    pub exercise_id: u32,
    pub exercise_name: String,
    pub weight_kg: f64,
    pub completed_at: DateTime<Utc>,
}

impl CompletionEntry {
    pub fn new(exercise_id: u32, exercise_name: impl Into<String>, weight_kg: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise_id,
            exercise_name: exercise_name.into(),
            weight_kg,
            completed_at: Utc::now(),
        }
    }
}

/// Destination for completion entries
pub trait CompletionSink {
    fn append(&mut self, entry: &CompletionEntry) -> Result<()>;
}

/// JSONL-based completion journal with file locking
pub struct JsonlJournal {
    path: PathBuf,
}

impl JsonlJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CompletionSink for JsonlJournal {
    fn append(&mut self, entry: &CompletionEntry) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended completion {} to journal", entry.id);
        Ok(())
    }
}

/// Read all entries from a journal file
///
/// Lines that fail to parse are skipped with a warning.
pub fn read_entries(path: &Path) -> Result<Vec<CompletionEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<CompletionEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Failed to parse journal line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} entries from journal", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read_single_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("completions.jsonl");

        let entry = CompletionEntry::new(192, "Bench Press", 62.5);
        let mut journal = JsonlJournal::new(&path);
        journal.append(&entry).unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries, vec![entry]);
    }

    #[test]
    fn test_append_multiple_entries() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/completions.jsonl");

        let mut journal = JsonlJournal::new(&path);
        for kg in [20.0, 22.5, 25.0] {
            journal.append(&CompletionEntry::new(81, "Biceps Curl", kg)).unwrap();
        }

        assert_eq!(read_entries(&path).unwrap().len(), 3);
    }

    #[test]
    fn test_read_missing_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let entries = read_entries(&temp_dir.path().join("nonexistent.jsonl")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("completions.jsonl");

        let good = serde_json::to_string(&CompletionEntry::new(1, "Squat", 100.0)).unwrap();
        std::fs::write(&path, format!("{{ broken\n\n{}\nnot json\n", good)).unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].exercise_id, 1);
    }
}
