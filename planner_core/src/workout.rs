//! Workout session orchestration.
//!
//! Ties a catalog source, a plan strategy and on-disk storage together:
//! fetch, plan, persist, then feed completions and swaps into the
//! [`SessionState`] and persist after every change.
//!
//! Data directory layout:
//! - `session.json` - current session snapshot
//! - `journal/completions.jsonl` - completion journal
//! - `completions.csv` - exported journal entries

use crate::catalog::CatalogProvider;
use crate::journal::{CompletionEntry, CompletionSink, JsonlJournal};
use crate::planner::PlanOrchestrator;
use crate::session::validate_weight;
use crate::store::SessionStore;
use crate::{Error, GoalProfile, PerformanceRecord, PlanSlot, Result, SessionState};
use std::path::{Path, PathBuf};

/// The current workout and where it lives on disk
pub struct WorkoutSession {
    store: SessionStore,
    journal_path: PathBuf,
    csv_path: PathBuf,
    state: Option<SessionState>,
}

impl WorkoutSession {
    /// Open the session stored under `data_dir`, if any
    pub fn open(data_dir: &Path) -> Result<Self> {
        let store = SessionStore::new(data_dir.join("session.json"));
        let state = store.load()?;

        Ok(Self {
            store,
            journal_path: data_dir.join("journal").join("completions.jsonl"),
            csv_path: data_dir.join("completions.csv"),
            state,
        })
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// The slot to perform next
    pub fn current(&self) -> Option<&PlanSlot> {
        self.state.as_ref().and_then(SessionState::next_exercise)
    }

    /// Best-ever loads: archived history plus the current session
    pub fn performance(&self) -> Result<Vec<PerformanceRecord>> {
        let stored = crate::history::load_performance(&self.journal_path, &self.csv_path)?;
        Ok(crate::history::merge_with_session(&stored, self.state.as_ref()))
    }

    /// Build a fresh plan and start a new session over it
    ///
    /// Progress of the previous session is discarded; its plan is offered to
    /// the strategy as the previous plan.
    pub fn regenerate_plan(
        &mut self,
        provider: &dyn CatalogProvider,
        orchestrator: &dyn PlanOrchestrator,
        goals: &GoalProfile,
        catalog_limit: usize,
    ) -> Result<&SessionState> {
        goals.validate()?;

        let catalog = provider.fetch_exercises(catalog_limit)?;
        let performance = self.performance()?;
        let previous_plan = self.state.as_ref().map(SessionState::plan);

        let plan = orchestrator.build_plan(goals, &catalog, &performance, previous_plan)?;
        tracing::info!("New plan with {} exercises", plan.queue.len());

        let state = SessionState::new(plan);
        self.store.save(&state)?;
        Ok(self.state.insert(state))
    }

    /// Complete the current exercise with the given working weight
    pub fn complete_current(&mut self, weight_kg: f64) -> Result<CompletionEntry> {
        validate_weight(weight_kg)?;

        let state = self
            .state
            .as_mut()
            .ok_or_else(|| Error::NotFound("no active plan".into()))?;
        let slot = state
            .next_exercise()
            .ok_or_else(|| Error::NotFound("workout is already complete".into()))?;

        let entry = CompletionEntry::new(slot.exercise.id, slot.exercise.name.clone(), weight_kg);
        state.complete(entry.exercise_id, weight_kg);

        // Snapshot first: a failed save must not leave a journaled completion behind.
        self.store.save(state)?;
        JsonlJournal::new(&self.journal_path).append(&entry)?;
        Ok(entry)
    }

    /// Swap the current exercise for one of its alternatives
    pub fn swap_current(&mut self, exercise_id: u32) -> Result<&PlanSlot> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| Error::NotFound("no active plan".into()))?;

        let slot_id = state.swap_to_alternative(exercise_id)?;
        self.store.save(state)?;

        state
            .plan()
            .queue
            .iter()
            .find(|slot| slot.id == slot_id)
            .ok_or_else(|| Error::State(format!("slot {} vanished after swap", slot_id)))
    }

    /// Drop the stored session
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear()?;
        self.state = None;
        Ok(())
    }
}
