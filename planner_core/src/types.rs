//! Core domain types for the workout planner.
//!
//! This module defines the fundamental types used throughout the system:
//! - Goal profiles driving exercise selection
//! - Exercises as supplied by a catalog
//! - Plan slots and the workout plan queue
//! - Performance records

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Maximum number of slots in a built plan
pub const MAX_PLAN_SLOTS: usize = 8;

/// Maximum number of substitute options carried by a slot
pub const MAX_ALTERNATIVES: usize = 3;

/// Sets prescribed for every slot by the rule-based planner
pub const DEFAULT_SETS: u32 = 4;

/// Rep range prescribed for every slot by the rule-based planner
pub const DEFAULT_REP_RANGE: RepRange = RepRange { min: 8, max: 12 };

const RESTING_HR_BOUNDS: (u32, u32) = (30, 220);

// ============================================================================
// Goal Profile
// ============================================================================

/// User preferences that drive exercise scoring
///
/// Muscle names are stored case-folded; use [`GoalProfile::new`] to get that
/// normalization for caller-supplied names.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GoalProfile {
    #[serde(default)]
    pub focus_muscles: BTreeSet<String>,
    #[serde(default)]
    pub reduced_muscles: BTreeSet<String>,
    #[serde(default)]
    pub excluded_muscles: BTreeSet<String>,
    #[serde(default)]
    pub cardio_enabled: bool,
    #[serde(default)]
    pub resting_heart_rate_target: Option<u32>,
}

impl GoalProfile {
    pub fn new<I, S>(
        focus: I,
        reduced: I,
        excluded: I,
        cardio_enabled: bool,
        resting_heart_rate_target: Option<u32>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            focus_muscles: fold_muscles(focus),
            reduced_muscles: fold_muscles(reduced),
            excluded_muscles: fold_muscles(excluded),
            cardio_enabled,
            resting_heart_rate_target,
        }
    }

    /// Return a copy with every muscle name trimmed and lower-cased
    pub fn normalized(&self) -> Self {
        Self {
            focus_muscles: fold_muscles(&self.focus_muscles),
            reduced_muscles: fold_muscles(&self.reduced_muscles),
            excluded_muscles: fold_muscles(&self.excluded_muscles),
            cardio_enabled: self.cardio_enabled,
            resting_heart_rate_target: self.resting_heart_rate_target,
        }
    }

    /// Whether the given muscle (any case) is excluded
    pub fn excludes(&self, muscle: &str) -> bool {
        self.excluded_muscles.contains(&muscle.to_lowercase())
    }

    /// Reject profiles that cannot be planned against
    pub fn validate(&self) -> Result<()> {
        let mut all = self
            .focus_muscles
            .iter()
            .chain(&self.reduced_muscles)
            .chain(&self.excluded_muscles);
        if all.any(|m| m.trim().is_empty()) {
            return Err(Error::InvalidInput("muscle names must not be blank".into()));
        }

        if let Some(muscle) = self
            .focus_muscles
            .iter()
            .find(|m| self.excluded_muscles.contains(*m))
        {
            return Err(Error::InvalidInput(format!(
                "muscle '{}' is both focused and excluded",
                muscle
            )));
        }

        if let Some(bpm) = self.resting_heart_rate_target {
            let (lo, hi) = RESTING_HR_BOUNDS;
            if !(lo..=hi).contains(&bpm) {
                return Err(Error::InvalidInput(format!(
                    "resting heart rate target {} outside {}..={} bpm",
                    bpm, lo, hi
                )));
            }
        }

        Ok(())
    }
}

fn fold_muscles<I, S>(muscles: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    muscles
        .into_iter()
        .map(|m| m.as_ref().trim().to_lowercase())
        .collect()
}

// ============================================================================
// Exercise and Plan Types
// ============================================================================

/// An exercise as supplied by a catalog
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: u32,
    pub name: String,
    pub primary_muscle: String,
    pub equipment: String,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl Exercise {
    /// Case-folded primary muscle, the key used for scoring and grouping
    pub fn muscle_key(&self) -> String {
        self.primary_muscle.to_lowercase()
    }
}

/// Inclusive repetition range
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepRange {
    pub min: u32,
    pub max: u32,
}

impl std::fmt::Display for RepRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// One position in the workout queue
///
/// The slot id is fixed at build time and survives substitutions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanSlot {
    pub id: u32,
    pub exercise: Exercise,
    pub sets: u32,
    pub rep_range: RepRange,
    pub alternatives: Vec<Exercise>,
}

/// An ordered workout queue
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub created_at: DateTime<Utc>,
    pub queue: Vec<PlanSlot>,
}

impl WorkoutPlan {
    /// Check the structural invariants a usable plan must hold for `goals`
    pub fn validate(&self, goals: &GoalProfile) -> Result<()> {
        if self.queue.len() > MAX_PLAN_SLOTS {
            return Err(Error::Plan(format!(
                "plan has {} slots, limit is {}",
                self.queue.len(),
                MAX_PLAN_SLOTS
            )));
        }

        let mut slot_ids = HashSet::new();
        for slot in &self.queue {
            if !slot_ids.insert(slot.id) {
                return Err(Error::Plan(format!("duplicate slot id {}", slot.id)));
            }
            if goals.excludes(&slot.exercise.primary_muscle) {
                return Err(Error::Plan(format!(
                    "slot {} uses excluded muscle '{}'",
                    slot.id, slot.exercise.primary_muscle
                )));
            }
            if slot.rep_range.min > slot.rep_range.max {
                return Err(Error::Plan(format!(
                    "slot {} has empty rep range {}",
                    slot.id, slot.rep_range
                )));
            }
            if slot.alternatives.len() > MAX_ALTERNATIVES {
                return Err(Error::Plan(format!(
                    "slot {} has {} alternatives",
                    slot.id,
                    slot.alternatives.len()
                )));
            }
            if slot
                .alternatives
                .iter()
                .any(|alt| alt.id == slot.exercise.id)
            {
                return Err(Error::Plan(format!(
                    "slot {} lists its own exercise as an alternative",
                    slot.id
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Performance
// ============================================================================

/// Best load ever used for an exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PerformanceRecord {
    pub exercise_id: u32,
    pub max_weight_kg: f64,
}
