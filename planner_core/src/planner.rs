//! Plan building strategies.
//!
//! This module implements the rule-based planning logic:
//! - Drop exercises that hit an excluded muscle
//! - Score the rest by goal focus (focus 10, reduced 2, otherwise 5)
//! - Stable sort by score, so ties keep catalog order
//! - Take the first eight as the queue, each with up to three same-muscle substitutes
//!
//! Richer strategies plug in through [`PlanOrchestrator`] and are wrapped in a
//! [`FallbackOrchestrator`] so the rule-based plan is always the worst case.

use crate::catalog::validate_catalog;
use crate::{
    Error, Exercise, GoalProfile, PerformanceRecord, PlanSlot, Result, WorkoutPlan,
    DEFAULT_REP_RANGE, DEFAULT_SETS, MAX_ALTERNATIVES, MAX_PLAN_SLOTS,
};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::HashSet;

const FOCUS_SCORE: u32 = 10;
const NEUTRAL_SCORE: u32 = 5;
const REDUCED_SCORE: u32 = 2;

/// A strategy that turns goals and a catalog into a workout plan
pub trait PlanOrchestrator {
    fn build_plan(
        &self,
        goals: &GoalProfile,
        catalog: &[Exercise],
        performance: &[PerformanceRecord],
        previous_plan: Option<&WorkoutPlan>,
    ) -> Result<WorkoutPlan>;
}

/// Deterministic planner, the guaranteed fallback for every other strategy
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleBasedPlanner;

impl PlanOrchestrator for RuleBasedPlanner {
    /// `performance` and `previous_plan` are accepted for interface
    /// compatibility; the baseline selection does not weigh them.
    fn build_plan(
        &self,
        goals: &GoalProfile,
        catalog: &[Exercise],
        _performance: &[PerformanceRecord],
        _previous_plan: Option<&WorkoutPlan>,
    ) -> Result<WorkoutPlan> {
        build_plan_at(Utc::now(), goals, catalog)
    }
}

/// Build the rule-based plan with an explicit creation time
///
/// Fails only when the catalog is structurally invalid.
pub fn build_plan_at(
    now: DateTime<Utc>,
    goals: &GoalProfile,
    catalog: &[Exercise],
) -> Result<WorkoutPlan> {
    ensure_valid_catalog(catalog)?;
    let goals = goals.normalized();

    let mut ranked: Vec<&Exercise> = catalog
        .iter()
        .filter(|e| !goals.excludes(&e.primary_muscle))
        .collect();

    // sort_by_key is stable
    ranked.sort_by_key(|e| Reverse(score(e, &goals)));

    let queue: Vec<PlanSlot> = ranked
        .iter()
        .take(MAX_PLAN_SLOTS)
        .enumerate()
        .map(|(idx, exercise)| PlanSlot {
            id: idx as u32,
            exercise: (*exercise).clone(),
            sets: DEFAULT_SETS,
            rep_range: DEFAULT_REP_RANGE,
            alternatives: alternatives_for(exercise, &ranked),
        })
        .collect();

    tracing::info!(
        "Built plan with {} slots from {} eligible of {} catalog exercises",
        queue.len(),
        ranked.len(),
        catalog.len()
    );

    Ok(WorkoutPlan {
        created_at: now,
        queue,
    })
}

fn score(exercise: &Exercise, goals: &GoalProfile) -> u32 {
    let muscle = exercise.muscle_key();
    if goals.focus_muscles.contains(&muscle) {
        FOCUS_SCORE
    } else if goals.reduced_muscles.contains(&muscle) {
        REDUCED_SCORE
    } else {
        NEUTRAL_SCORE
    }
}

/// Same-muscle peers from the full ranked list, in ranked order
fn alternatives_for(exercise: &Exercise, ranked: &[&Exercise]) -> Vec<Exercise> {
    let muscle = exercise.muscle_key();
    ranked
        .iter()
        .filter(|other| other.id != exercise.id && other.muscle_key() == muscle)
        .take(MAX_ALTERNATIVES)
        .map(|other| (*other).clone())
        .collect()
}

fn ensure_valid_catalog(catalog: &[Exercise]) -> Result<()> {
    let errors = validate_catalog(catalog);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::CatalogValidation(errors.join("; ")))
    }
}

/// Runs a primary strategy and falls back to [`RuleBasedPlanner`]
///
/// The primary's plan is used only if it succeeds, passes
/// [`WorkoutPlan::validate`] and uses exercises from the supplied catalog.
#[derive(Clone, Debug, Default)]
pub struct FallbackOrchestrator<P> {
    primary: P,
    fallback: RuleBasedPlanner,
}

impl<P: PlanOrchestrator> FallbackOrchestrator<P> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: RuleBasedPlanner,
        }
    }
}

impl<P: PlanOrchestrator> PlanOrchestrator for FallbackOrchestrator<P> {
    fn build_plan(
        &self,
        goals: &GoalProfile,
        catalog: &[Exercise],
        performance: &[PerformanceRecord],
        previous_plan: Option<&WorkoutPlan>,
    ) -> Result<WorkoutPlan> {
        // The fallback would hit the same structural problem.
        ensure_valid_catalog(catalog)?;

        match self
            .primary
            .build_plan(goals, catalog, performance, previous_plan)
            .and_then(|plan| accept_plan(plan, goals, catalog))
        {
            Ok(plan) => Ok(plan),
            Err(e) => {
                tracing::warn!("Primary plan strategy failed ({}), using rule-based plan", e);
                self.fallback
                    .build_plan(goals, catalog, performance, previous_plan)
            }
        }
    }
}

fn accept_plan(plan: WorkoutPlan, goals: &GoalProfile, catalog: &[Exercise]) -> Result<WorkoutPlan> {
    plan.validate(&goals.normalized())?;

    let known: HashSet<u32> = catalog.iter().map(|e| e.id).collect();
    let unknown = plan
        .queue
        .iter()
        .flat_map(|slot| std::iter::once(&slot.exercise).chain(&slot.alternatives))
        .find(|e| !known.contains(&e.id));
    if let Some(exercise) = unknown {
        return Err(Error::Plan(format!(
            "exercise {} is not in the catalog",
            exercise.id
        )));
    }

    Ok(plan)
}
