#![forbid(unsafe_code)]

//! Core domain model and business logic for the workout planner.
//!
//! This crate provides:
//! - Domain types (goals, exercises, plan slots, plans)
//! - Catalog sources
//! - Plan building strategies with a rule-based fallback
//! - Session progress tracking
//! - Persistence (session snapshot, completion journal, CSV export)
//! - Performance history

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod planner;
pub mod session;
pub mod store;
pub mod journal;
pub mod export;
pub mod history;
pub mod workout;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{BuiltinCatalog, CatalogProvider, JsonCatalogFile};
pub use config::Config;
pub use planner::{build_plan_at, FallbackOrchestrator, PlanOrchestrator, RuleBasedPlanner};
pub use session::SessionState;
pub use store::SessionStore;
pub use journal::{CompletionEntry, CompletionSink, JsonlJournal};
pub use history::load_performance;
pub use workout::WorkoutSession;
