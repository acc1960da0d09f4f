// SPDX-License-Identifier: MIT

//! Loads a [`WorkflowDefinition`] from JSON or YAML text (§6) and optionally
//! runs it through the validator before handing it back, so a caller at the
//! boundary (CLI, HTTP endpoint) gets one place to reject a malformed or
//! structurally invalid definition.

use crate::errors::{ValidationError, ValidationIssue};
use crate::model::WorkflowDefinition;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse workflow JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse workflow YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub fn load_workflow_json(text: &str) -> Result<WorkflowDefinition, LoadError> {
    Ok(WorkflowDefinition::from_json(text)?)
}

pub fn load_workflow_yaml(text: &str) -> Result<WorkflowDefinition, LoadError> {
    Ok(WorkflowDefinition::from_yaml(text)?)
}

/// Parses `text` by sniffing its format from `path`'s extension
/// (`.yaml`/`.yml` vs. anything else treated as JSON), then validates the
/// result, returning both the definition and any non-fatal warnings.
pub fn load_and_validate_workflow(path: &str, text: &str) -> Result<(WorkflowDefinition, Vec<ValidationIssue>), LoadError> {
    let workflow = if path.ends_with(".yaml") || path.ends_with(".yml") {
        load_workflow_yaml(text)?
    } else {
        load_workflow_json(text)?
    };

    let warnings = crate::validator::validate_workflow(&workflow)?;
    Ok((workflow, warnings))
}
