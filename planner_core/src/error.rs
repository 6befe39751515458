//! Error types for the planner_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for planner_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The exercise catalog could not be obtained from its provider
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Catalog is structurally invalid
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Caller supplied a malformed goal profile or weight
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Referenced exercise or slot is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// A plan strategy produced no usable plan
    #[error("Plan error: {0}")]
    Plan(String),

    /// Session state management error
    #[error("State error: {0}")]
    State(String),
}
