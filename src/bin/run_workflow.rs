// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! CLI demo: loads a workflow definition (JSON or YAML) from disk, runs it
//! against a stubbed HTTP client, and prints the run result.
//!
//! `anyhow` is used only at this binary boundary — the library itself never
//! returns it (§7's own typed `thiserror` taxonomy covers everything inside
//! the crate).

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::sync::Arc;
use workflow_dag_engine::executors::{default_registry, StubHttpClient};
use workflow_dag_engine::orchestrator;
use workflow_dag_engine::workflow::load_and_validate_workflow;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        bail!("Usage: {} <workflow.json|workflow.yaml>", args[0]);
    }

    let path = &args[1];
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;

    let (workflow, warnings) =
        load_and_validate_workflow(path, &text).with_context(|| format!("{path} is not a runnable workflow"))?;

    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    let registry = Arc::new(default_registry(Arc::new(StubHttpClient::default())));
    let result = orchestrator::execute(workflow, registry, None).await;

    println!("{}", serde_json::to_string_pretty(&result).context("run result always serializes")?);

    if result.get("status").and_then(|s| s.as_str()) == Some("failed") {
        std::process::exit(1);
    }
    Ok(())
}
