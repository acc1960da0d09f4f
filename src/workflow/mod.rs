// SPDX-License-Identifier: MIT

//! Workflow-definition I/O: parsing the wire format (§6) and validating it
//! at the boundary, before a run ever reaches the orchestrator.

mod loader;

pub use loader::{load_and_validate_workflow, load_workflow_json, load_workflow_yaml, LoadError};
