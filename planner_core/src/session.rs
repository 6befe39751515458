//! Session progress tracking.
//!
//! A [`SessionState`] wraps one built plan and records which exercises have
//! been completed and the heaviest load used for each. The session is
//! *finished* once every queued exercise id is in the completed set.
//!
//! Mutation is single-writer: the owner serializes calls.

use crate::{Error, Exercise, PerformanceRecord, PlanSlot, Result, WorkoutPlan, MAX_ALTERNATIVES};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Progress through one workout plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    plan: WorkoutPlan,
    #[serde(default)]
    completed_exercise_ids: BTreeSet<u32>,
    #[serde(default)]
    max_kg_by_exercise_id: BTreeMap<u32, f64>,
}

impl SessionState {
    /// Start a fresh session over `plan`
    pub fn new(plan: WorkoutPlan) -> Self {
        Self {
            plan,
            completed_exercise_ids: BTreeSet::new(),
            max_kg_by_exercise_id: BTreeMap::new(),
        }
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn completed_exercise_ids(&self) -> &BTreeSet<u32> {
        &self.completed_exercise_ids
    }

    pub fn max_kg_by_exercise_id(&self) -> &BTreeMap<u32, f64> {
        &self.max_kg_by_exercise_id
    }

    /// Best recorded load for an exercise in this session
    pub fn max_kg(&self, exercise_id: u32) -> Option<f64> {
        self.max_kg_by_exercise_id.get(&exercise_id).copied()
    }

    /// First slot in queue order whose exercise is not yet completed
    pub fn next_exercise(&self) -> Option<&PlanSlot> {
        self.plan
            .queue
            .iter()
            .find(|slot| !self.completed_exercise_ids.contains(&slot.exercise.id))
    }

    pub fn is_finished(&self) -> bool {
        self.next_exercise().is_none()
    }

    pub fn is_completed(&self, exercise_id: u32) -> bool {
        self.completed_exercise_ids.contains(&exercise_id)
    }

    /// Completed slots and total slots
    pub fn progress(&self) -> (usize, usize) {
        let done = self
            .plan
            .queue
            .iter()
            .filter(|slot| self.is_completed(slot.exercise.id))
            .count();
        (done, self.plan.queue.len())
    }

    fn in_queue(&self, exercise_id: u32) -> bool {
        self.plan
            .queue
            .iter()
            .any(|slot| slot.exercise.id == exercise_id)
    }

    /// Mark an exercise done and keep its best load
    ///
    /// Idempotent, and the stored maximum never decreases. Ids that are not
    /// the exercise of any queued slot are ignored. Weight validation belongs
    /// to the caller; see [`SessionState::try_complete`].
    pub fn complete(&mut self, exercise_id: u32, used_weight_kg: f64) {
        if !self.in_queue(exercise_id) {
            tracing::debug!("Ignoring completion of exercise {} (not in plan)", exercise_id);
            return;
        }

        self.completed_exercise_ids.insert(exercise_id);

        let best = self.max_kg_by_exercise_id.entry(exercise_id).or_insert(0.0);
        if used_weight_kg > *best {
            *best = used_weight_kg;
        }

        tracing::info!(
            "Completed exercise {} at {} kg (best {} kg)",
            exercise_id,
            used_weight_kg,
            best
        );
    }

    /// Like [`SessionState::complete`], but reports bad input instead of ignoring it
    pub fn try_complete(&mut self, exercise_id: u32, used_weight_kg: f64) -> Result<()> {
        validate_weight(used_weight_kg)?;
        if !self.in_queue(exercise_id) {
            return Err(Error::NotFound(format!(
                "exercise {} is not in the plan",
                exercise_id
            )));
        }
        self.complete(exercise_id, used_weight_kg);
        Ok(())
    }

    /// Replace the active slot's exercise, keeping the slot's id and prescription
    ///
    /// The replacement leaves the alternatives list and the displaced exercise
    /// joins its end. The list is trimmed from the front to stay within
    /// [`MAX_ALTERNATIVES`]. No-op when finished or when `replacement` is
    /// already the active exercise.
    pub fn swap_current_exercise(&mut self, replacement: Exercise) {
        let Some(slot_id) = self.next_exercise().map(|slot| slot.id) else {
            tracing::debug!("Swap requested on a finished session; ignoring");
            return;
        };
        let Some(slot) = self.plan.queue.iter_mut().find(|slot| slot.id == slot_id) else {
            return;
        };

        if slot.exercise.id == replacement.id {
            return;
        }

        let previous = std::mem::replace(&mut slot.exercise, replacement);
        slot.alternatives.retain(|alt| alt.id != slot.exercise.id);
        slot.alternatives.push(previous);

        let overflow = slot.alternatives.len().saturating_sub(MAX_ALTERNATIVES);
        slot.alternatives.drain(..overflow);

        tracing::info!(
            "Slot {}: swapped to exercise {} ({})",
            slot.id,
            slot.exercise.id,
            slot.exercise.name
        );
    }

    /// Swap the active slot to one of its listed alternatives
    ///
    /// Returns the id of the swapped slot. An alternative that was already
    /// completed elsewhere in the queue is refused, since the slot would
    /// then count as done without being performed.
    pub fn swap_to_alternative(&mut self, exercise_id: u32) -> Result<u32> {
        let slot = self
            .next_exercise()
            .ok_or_else(|| Error::NotFound("session is finished".into()))?;
        let slot_id = slot.id;

        let replacement = slot
            .alternatives
            .iter()
            .find(|alt| alt.id == exercise_id)
            .cloned()
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "exercise {} is not an alternative for slot {}",
                    exercise_id, slot.id
                ))
            })?;

        if self.is_completed(replacement.id) {
            return Err(Error::InvalidInput(format!(
                "exercise {} ({}) is already completed",
                replacement.id, replacement.name
            )));
        }

        self.swap_current_exercise(replacement);
        Ok(slot_id)
    }

    /// Best loads as records, ordered by exercise id
    pub fn performance_records(&self) -> Vec<PerformanceRecord> {
        self.max_kg_by_exercise_id
            .iter()
            .map(|(&exercise_id, &max_weight_kg)| PerformanceRecord {
                exercise_id,
                max_weight_kg,
            })
            .collect()
    }
}

/// Reject weights that cannot be a working load
pub fn validate_weight(kg: f64) -> Result<()> {
    if !kg.is_finite() || kg < 0.0 {
        return Err(Error::InvalidInput(format!(
            "weight must be a non-negative number of kg, got {}",
            kg
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RepRange, DEFAULT_REP_RANGE};
    use chrono::Utc;

    fn exercise(id: u32, name: &str, muscle: &str) -> Exercise {
        Exercise {
            id,
            name: name.into(),
            primary_muscle: muscle.into(),
            equipment: "dumbbell".into(),
            image_ref: None,
        }
    }

    fn slot(id: u32, exercise: Exercise, alternatives: Vec<Exercise>) -> PlanSlot {
        PlanSlot {
            id,
            exercise,
            sets: 4,
            rep_range: DEFAULT_REP_RANGE,
            alternatives,
        }
    }

    fn two_slot_session() -> SessionState {
        SessionState::new(WorkoutPlan {
            created_at: Utc::now(),
            queue: vec![
                slot(0, exercise(11, "Incline Press", "chest"), vec![]),
                slot(1, exercise(12, "Lat Pulldown", "back"), vec![]),
            ],
        })
    }

    fn ids(exercises: &[Exercise]) -> Vec<u32> {
        exercises.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_tracks_max_kg_and_moves_to_next_exercise() {
        let mut session = two_slot_session();

        session.complete(11, 45.0);
        session.complete(11, 42.0);

        assert_eq!(session.max_kg(11), Some(45.0));
        assert_eq!(session.next_exercise().map(|s| s.exercise.id), Some(12));
    }

    #[test]
    fn test_complete_is_idempotent() {
        let mut once = two_slot_session();
        once.complete(11, 30.0);

        let mut twice = once.clone();
        twice.complete(11, 30.0);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_max_never_decreases() {
        let mut session = two_slot_session();
        let mut last = 0.0;
        for kg in [20.0, 35.0, 10.0, 35.0, 50.0, 0.0] {
            session.complete(12, kg);
            let best = session.max_kg(12).unwrap();
            assert!(best >= last);
            last = best;
        }
        assert_eq!(last, 50.0);
    }

    #[test]
    fn test_finished_iff_all_completed() {
        let mut session = two_slot_session();
        assert!(!session.is_finished());
        assert_eq!(session.progress(), (0, 2));

        session.complete(12, 10.0);
        assert_eq!(session.next_exercise().map(|s| s.id), Some(0));

        session.complete(11, 10.0);
        assert!(session.is_finished());
        assert!(session.next_exercise().is_none());
        assert_eq!(session.progress(), (2, 2));
    }

    #[test]
    fn test_empty_plan_is_finished() {
        let session = SessionState::new(WorkoutPlan {
            created_at: Utc::now(),
            queue: vec![],
        });
        assert!(session.is_finished());
    }

    #[test]
    fn test_complete_unknown_id_is_ignored() {
        let mut session = two_slot_session();
        let before = session.clone();
        session.complete(999, 80.0);
        assert_eq!(session, before);
    }

    #[test]
    fn test_try_complete_reports_bad_input() {
        let mut session = two_slot_session();
        assert!(matches!(
            session.try_complete(999, 10.0),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            session.try_complete(11, -5.0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            session.try_complete(11, f64::NAN),
            Err(Error::InvalidInput(_))
        ));
        assert!(session.completed_exercise_ids().is_empty());

        session.try_complete(11, 0.0).unwrap();
        assert!(session.is_completed(11));
        assert_eq!(session.max_kg(11), Some(0.0));
    }

    #[test]
    fn test_swap_preserves_slot_identity() {
        let mut session = SessionState::new(WorkoutPlan {
            created_at: Utc::now(),
            queue: vec![PlanSlot {
                id: 7,
                exercise: exercise(1, "Bench Press", "chest"),
                sets: 5,
                rep_range: RepRange { min: 3, max: 5 },
                alternatives: vec![exercise(2, "Cable Fly", "chest"), exercise(3, "Push-up", "chest")],
            }],
        });

        session.swap_current_exercise(exercise(2, "Cable Fly", "chest"));

        let slot = session.next_exercise().unwrap();
        assert_eq!(slot.id, 7);
        assert_eq!(slot.sets, 5);
        assert_eq!(slot.rep_range, RepRange { min: 3, max: 5 });
        assert_eq!(slot.exercise.id, 2);
        assert_eq!(ids(&slot.alternatives), vec![3, 1]);
    }

    #[test]
    fn test_swap_targets_active_slot_only() {
        let mut session = two_slot_session();
        session.complete(11, 40.0);

        session.swap_current_exercise(exercise(20, "Seated Row", "back"));

        assert_eq!(session.plan().queue[0].exercise.id, 11);
        let active = &session.plan().queue[1];
        assert_eq!(active.exercise.id, 20);
        assert_eq!(ids(&active.alternatives), vec![12]);
    }

    #[test]
    fn test_swap_caps_alternatives_dropping_oldest() {
        let mut session = SessionState::new(WorkoutPlan {
            created_at: Utc::now(),
            queue: vec![slot(
                0,
                exercise(1, "Bench Press", "chest"),
                vec![
                    exercise(2, "Cable Fly", "chest"),
                    exercise(3, "Push-up", "chest"),
                    exercise(4, "Dip", "chest"),
                ],
            )],
        });

        // Replacement from outside the list pushes the count past the cap.
        session.swap_current_exercise(exercise(5, "Pec Deck", "chest"));
        let slot = session.next_exercise().unwrap();
        assert_eq!(ids(&slot.alternatives), vec![3, 4, 1]);

        // Repeated swaps never grow the list.
        for id in [3, 4, 1, 5] {
            session.swap_to_alternative(id).unwrap();
            let slot = session.next_exercise().unwrap();
            assert_eq!(slot.exercise.id, id);
            assert!(slot.alternatives.len() <= MAX_ALTERNATIVES);
            assert!(slot.alternatives.iter().all(|a| a.id != id));
        }
    }

    #[test]
    fn test_swap_to_same_exercise_is_noop() {
        let mut session = two_slot_session();
        let before = session.clone();
        session.swap_current_exercise(exercise(11, "Incline Press", "chest"));
        assert_eq!(session, before);
    }

    #[test]
    fn test_swap_on_finished_session_is_noop() {
        let mut session = two_slot_session();
        session.complete(11, 10.0);
        session.complete(12, 10.0);
        let before = session.clone();

        session.swap_current_exercise(exercise(30, "Row", "back"));
        assert_eq!(session, before);
        assert!(matches!(
            session.swap_to_alternative(30),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_swap_to_completed_alternative_refused() {
        let mut session = SessionState::new(WorkoutPlan {
            created_at: Utc::now(),
            queue: vec![
                slot(0, exercise(1, "Bench Press", "chest"), vec![exercise(2, "Cable Fly", "chest")]),
                slot(1, exercise(2, "Cable Fly", "chest"), vec![exercise(1, "Bench Press", "chest")]),
            ],
        });
        session.complete(1, 50.0);
        let before = session.clone();

        assert!(matches!(
            session.swap_to_alternative(1),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(session, before);
        assert_eq!(session.next_exercise().map(|s| s.id), Some(1));
    }

    #[test]
    fn test_swap_to_alternative_returns_slot_id() {
        let mut session = SessionState::new(WorkoutPlan {
            created_at: Utc::now(),
            queue: vec![slot(
                4,
                exercise(1, "Bench Press", "chest"),
                vec![exercise(2, "Cable Fly", "chest")],
            )],
        });
        assert_eq!(session.swap_to_alternative(2).unwrap(), 4);
    }

    #[test]
    fn test_swap_to_alternative_requires_listed_exercise() {
        let mut session = two_slot_session();
        assert!(matches!(
            session.swap_to_alternative(12),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_performance_records_sorted_by_id() {
        let mut session = two_slot_session();
        session.complete(12, 60.0);
        session.complete(11, 45.0);

        let records = session.performance_records();
        assert_eq!(
            records,
            vec![
                PerformanceRecord { exercise_id: 11, max_weight_kg: 45.0 },
                PerformanceRecord { exercise_id: 12, max_weight_kg: 60.0 },
            ]
        );
    }

    #[test]
    fn test_snapshot_shape() {
        let mut session = two_slot_session();
        session.complete(11, 45.0);

        let value = serde_json::to_value(&session).unwrap();
        assert!(value["plan"]["queue"].is_array());
        assert_eq!(value["completed_exercise_ids"], serde_json::json!([11]));
        assert_eq!(value["max_kg_by_exercise_id"]["11"], serde_json::json!(45.0));

        let restored: SessionState = serde_json::from_value(value).unwrap();
        assert_eq!(restored, session);
    }
}
