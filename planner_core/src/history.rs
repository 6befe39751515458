//! Best-ever performance from the completion journal and its CSV archive.

use crate::export::CsvRow;
use crate::journal::CompletionEntry;
use crate::{PerformanceRecord, Result, SessionState};
use csv::ReaderBuilder;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Fold the journal and the CSV archive into one record per exercise
///
/// Entries present in both sources (matched by entry id) count once.
/// Records are ordered by exercise id.
pub fn load_performance(log_path: &Path, csv_path: &Path) -> Result<Vec<PerformanceRecord>> {
    let mut seen_ids = HashSet::new();
    let mut best: BTreeMap<u32, f64> = BTreeMap::new();
    let mut count = 0;

    let mut record = |id: String, exercise_id: u32, kg: f64| {
        if seen_ids.insert(id) {
            count += 1;
            let slot = best.entry(exercise_id).or_insert(0.0);
            if kg > *slot {
                *slot = kg;
            }
        }
    };

    for entry in crate::journal::read_entries(log_path)? {
        record(entry.id.to_string(), entry.exercise_id, entry.weight_kg);
    }

    if csv_path.exists() {
        for row in load_rows_from_csv(csv_path)? {
            record(row.id, row.exercise_id, row.weight_kg);
        }
    }

    tracing::info!(
        "Loaded performance for {} exercises from {} completions",
        best.len(),
        count
    );

    Ok(into_records(best))
}

/// Combine stored records with a session's in-progress bests
pub fn merge_with_session(
    records: &[PerformanceRecord],
    session: Option<&SessionState>,
) -> Vec<PerformanceRecord> {
    let mut best: BTreeMap<u32, f64> = records
        .iter()
        .map(|r| (r.exercise_id, r.max_weight_kg))
        .collect();

    let session_records = session.map(SessionState::performance_records).unwrap_or_default();
    for r in session_records {
        let slot = best.entry(r.exercise_id).or_insert(0.0);
        if r.max_weight_kg > *slot {
            *slot = r.max_weight_kg;
        }
    }

    into_records(best)
}

fn into_records(best: BTreeMap<u32, f64>) -> Vec<PerformanceRecord> {
    best.into_iter()
        .map(|(exercise_id, max_weight_kg)| PerformanceRecord {
            exercise_id,
            max_weight_kg,
        })
        .collect()
}

fn load_rows_from_csv(path: &Path) -> Result<Vec<CsvRow>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!("Failed to deserialize CSV row: {}", e),
        }
    }

    Ok(rows)
}

/// Most recent journal entry for an exercise, if any
pub fn last_completion<'a>(
    entries: &'a [CompletionEntry],
    exercise_id: u32,
) -> Option<&'a CompletionEntry> {
    entries
        .iter()
        .filter(|e| e.exercise_id == exercise_id)
        .max_by_key(|e| e.completed_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{CompletionSink, JsonlJournal};
    use crate::{Exercise, PlanSlot, WorkoutPlan, DEFAULT_REP_RANGE};
    use chrono::{Duration, Utc};

    #[test]
    fn test_best_weight_per_exercise() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("completions.jsonl");

        let mut journal = JsonlJournal::new(&log_path);
        for (id, kg) in [(1, 60.0), (1, 70.0), (1, 65.0), (2, 20.0)] {
            journal.append(&CompletionEntry::new(id, "x", kg)).unwrap();
        }

        let records =
            load_performance(&log_path, &temp_dir.path().join("completions.csv")).unwrap();
        assert_eq!(
            records,
            vec![
                PerformanceRecord { exercise_id: 1, max_weight_kg: 70.0 },
                PerformanceRecord { exercise_id: 2, max_weight_kg: 20.0 },
            ]
        );
    }

    #[test]
    fn test_archived_entries_count_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("completions.jsonl");
        let csv_path = temp_dir.path().join("completions.csv");

        JsonlJournal::new(&log_path)
            .append(&CompletionEntry::new(5, "Deadlift", 140.0))
            .unwrap();
        crate::export::log_to_csv_and_archive(&log_path, &csv_path).unwrap();

        JsonlJournal::new(&log_path)
            .append(&CompletionEntry::new(5, "Deadlift", 120.0))
            .unwrap();

        let records = load_performance(&log_path, &csv_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].max_weight_kg, 140.0);
    }

    #[test]
    fn test_no_sources_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let records = load_performance(
            &temp_dir.path().join("none.jsonl"),
            &temp_dir.path().join("none.csv"),
        )
        .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_merge_with_session_keeps_higher() {
        let stored = vec![
            PerformanceRecord { exercise_id: 1, max_weight_kg: 50.0 },
            PerformanceRecord { exercise_id: 2, max_weight_kg: 90.0 },
        ];

        let exercise = |id: u32| Exercise {
            id,
            name: format!("Exercise {}", id),
            primary_muscle: "back".into(),
            equipment: "cable".into(),
            image_ref: None,
        };
        let mut session = SessionState::new(WorkoutPlan {
            created_at: Utc::now(),
            queue: [1, 2, 3]
                .into_iter()
                .map(|id| PlanSlot {
                    id: id - 1,
                    exercise: exercise(id),
                    sets: 4,
                    rep_range: DEFAULT_REP_RANGE,
                    alternatives: vec![],
                })
                .collect(),
        });
        session.complete(1, 55.0);
        session.complete(2, 80.0);
        session.complete(3, 10.0);

        let merged = merge_with_session(&stored, Some(&session));
        let kgs: Vec<_> = merged.iter().map(|r| r.max_weight_kg).collect();
        assert_eq!(kgs, vec![55.0, 90.0, 10.0]);

        assert_eq!(merge_with_session(&stored, None), stored);
    }

    #[test]
    fn test_last_completion() {
        let mut older = CompletionEntry::new(3, "Press", 40.0);
        older.completed_at = Utc::now() - Duration::days(2);
        let newer = CompletionEntry::new(3, "Press", 35.0);
        let other = CompletionEntry::new(4, "Curl", 15.0);

        let entries = vec![newer.clone(), older, other];
        assert_eq!(last_completion(&entries, 3), Some(&newer));
        assert!(last_completion(&entries, 9).is_none());
    }
}
