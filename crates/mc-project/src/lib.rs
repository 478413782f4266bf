//! mc-project: problem file format, validation and compilation.
//!
//! A project file (YAML or JSON) declares a model and the phase posed on it.
//! Loading migrates older versions and validates names and references;
//! [`compile`] then builds the [`mc_problem::Problem`] through the model
//! builder and a type [`mc_problem::Registry`].

pub mod compile;
pub mod migrate;
pub mod reference;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use compile::{build_model, compile};
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use reference::load_reference;
pub use schema::*;
pub use validate::{GROUND, ValidationError, validate_project};

use mc_model::ModelError;
use mc_problem::ProblemError;
use mc_table::TableError;
use tracing::debug;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Reference '{path}': {what}")]
    Reference { path: String, what: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Problem error: {0}")]
    Problem(#[from] ProblemError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    let project: Project = serde_yaml::from_str(&content)?;
    finish_load(path, project)
}

pub fn save_yaml(path: &Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_yaml::to_string(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    let project: Project = serde_json::from_str(&content)?;
    finish_load(path, project)
}

pub fn save_json(path: &Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_json::to_string_pretty(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load(path: &Path) -> ProjectResult<Project> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

fn finish_load(path: &Path, project: Project) -> ProjectResult<Project> {
    let project = migrate_to_latest(project)?;
    validate_project(&project)?;
    debug!(path = %path.display(), name = %project.name, "loaded project");
    Ok(project)
}
