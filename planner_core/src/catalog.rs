//! Exercise catalog sources.
//!
//! A catalog is a plain ordered list of exercises. Order matters: the
//! planner breaks score ties by catalog position.

use crate::{Error, Exercise, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Supplies exercises for planning
///
/// Failures surface as [`Error::CatalogUnavailable`] and are never retried
/// here; the caller owns retry policy.
pub trait CatalogProvider {
    fn fetch_exercises(&self, limit: usize) -> Result<Vec<Exercise>>;
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Vec<Exercise>> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static [Exercise] {
    &DEFAULT_CATALOG
}

/// Built-in catalog, used when no catalog file is configured
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinCatalog;

impl CatalogProvider for BuiltinCatalog {
    fn fetch_exercises(&self, limit: usize) -> Result<Vec<Exercise>> {
        let exercises: Vec<_> = get_default_catalog().iter().take(limit).cloned().collect();
        tracing::debug!("Serving {} exercises from built-in catalog", exercises.len());
        Ok(exercises)
    }
}

/// Catalog read from a JSON file on disk
///
/// Accepts either a plain array of exercises or an exercise-database export
/// of the form `{"results": [...]}`.
#[derive(Clone, Debug)]
pub struct JsonCatalogFile {
    path: PathBuf,
}

impl JsonCatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogProvider for JsonCatalogFile {
    fn fetch_exercises(&self, limit: usize) -> Result<Vec<Exercise>> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::CatalogUnavailable(format!("cannot read {:?}: {}", self.path, e))
        })?;

        let exercises = parse_catalog(&contents)?;
        tracing::info!(
            "Loaded {} exercises from {:?}",
            exercises.len(),
            self.path
        );
        Ok(exercises.into_iter().take(limit).collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Plain(Vec<Exercise>),
    Export { results: Vec<ExportExercise> },
}

#[derive(Deserialize)]
struct ExportExercise {
    id: u32,
    name: String,
    category: Option<ExportNamed>,
    #[serde(default)]
    equipment: Vec<ExportNamed>,
    #[serde(default)]
    images: Vec<ExportImage>,
}

#[derive(Deserialize)]
struct ExportNamed {
    name: String,
}

#[derive(Deserialize)]
struct ExportImage {
    image: String,
}

impl ExportExercise {
    fn into_exercise(self) -> Option<Exercise> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Exercise {
            id: self.id,
            name: name.to_string(),
            primary_muscle: self
                .category
                .map(|c| c.name.to_lowercase())
                .unwrap_or_else(|| "full body".into()),
            equipment: self
                .equipment
                .into_iter()
                .next()
                .map(|e| e.name)
                .unwrap_or_else(|| "unknown".into()),
            image_ref: self.images.into_iter().next().map(|i| i.image),
        })
    }
}

/// Parse catalog JSON in either supported shape
pub fn parse_catalog(json: &str) -> Result<Vec<Exercise>> {
    let document: CatalogDocument = serde_json::from_str(json)
        .map_err(|e| Error::CatalogUnavailable(format!("unreadable catalog: {}", e)))?;

    Ok(match document {
        CatalogDocument::Plain(exercises) => exercises,
        CatalogDocument::Export { results } => results
            .into_iter()
            .filter_map(ExportExercise::into_exercise)
            .collect(),
    })
}

/// Validate the catalog structure
///
/// Returns a list of problems; an empty list means the catalog is usable.
pub fn validate_catalog(catalog: &[Exercise]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for exercise in catalog {
        if !seen.insert(exercise.id) {
            errors.push(format!("Duplicate exercise id {}", exercise.id));
        }
        if exercise.name.trim().is_empty() {
            errors.push(format!("Exercise {} has a blank name", exercise.id));
        }
        if exercise.primary_muscle.trim().is_empty() {
            errors.push(format!("Exercise {} has no primary muscle", exercise.id));
        }
    }

    errors
}

fn entry(id: u32, name: &str, muscle: &str, equipment: &str) -> Exercise {
    Exercise {
        id,
        name: name.into(),
        primary_muscle: muscle.into(),
        equipment: equipment.into(),
        image_ref: None,
    }
}

/// Builds the default catalog
///
/// Prefer [`get_default_catalog`] outside of tests.
pub fn build_default_catalog() -> Vec<Exercise> {
    vec![
        entry(192, "Bench Press", "chest", "barbell"),
        entry(97, "Incline Dumbbell Press", "chest", "dumbbell"),
        entry(122, "Cable Fly", "chest", "cable"),
        entry(195, "Push-up", "chest", "none (bodyweight exercise)"),
        entry(111, "Back Squat", "legs", "barbell"),
        entry(371, "Leg Press", "legs", "machine"),
        entry(113, "Walking Lunge", "legs", "dumbbell"),
        entry(184, "Romanian Deadlift", "legs", "barbell"),
        entry(109, "Seated Cable Row", "back", "cable"),
        entry(158, "Lat Pulldown", "back", "cable"),
        entry(107, "Pull-up", "back", "pull-up bar"),
        entry(106, "Bent Over Row", "back", "barbell"),
        entry(119, "Overhead Press", "shoulders", "barbell"),
        entry(148, "Lateral Raise", "shoulders", "dumbbell"),
        entry(233, "Face Pull", "shoulders", "cable"),
        entry(81, "Biceps Curl", "arms", "dumbbell"),
        entry(85, "Triceps Pushdown", "arms", "cable"),
        entry(86, "Hammer Curl", "arms", "dumbbell"),
        entry(91, "Crunch", "abs", "none (bodyweight exercise)"),
        entry(238, "Plank", "abs", "none (bodyweight exercise)"),
        entry(125, "Hanging Leg Raise", "abs", "pull-up bar"),
        entry(304, "Standing Calf Raise", "calves", "machine"),
    ]
}
