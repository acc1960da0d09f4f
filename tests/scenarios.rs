// SPDX-License-Identifier: MIT

//! End-to-end scenarios run through the whole orchestrator, one per
//! documented shape: a linear run, a diamond with asymmetric skip, a
//! three-way fork joined back together, a loop, and error routing around a
//! success/error edge pair.

use serde_json::{json, Value};
use std::sync::Arc;
use workflow_dag_engine::executors::{default_registry, HttpClient, HttpResponse, StubHttpClient};
use workflow_dag_engine::model::WorkflowDefinition;
use workflow_dag_engine::orchestrator;

fn workflow(value: Value) -> WorkflowDefinition {
    serde_json::from_value(value).expect("test workflow literal is well-formed")
}

async fn run(value: Value) -> Value {
    let registry = Arc::new(default_registry(Arc::new(StubHttpClient::new(200, json!({"ok": true})))));
    orchestrator::execute(workflow(value), registry, None).await
}

#[tokio::test]
async fn linear_run_completes_in_declared_order() {
    let result = run(json!({
        "id": "wf-linear",
        "name": "linear",
        "nodes": [
            {"id": "s", "type": "start", "name": "s"},
            {"id": "a", "type": "condition", "name": "a", "config": {"expression": "1==1"}},
            {"id": "e", "type": "end", "name": "e"},
        ],
        "edges": [
            {"source": "s", "target": "a"},
            {"source": "a", "target": "e", "type": "condition", "condition": true},
        ],
    }))
    .await;

    assert_eq!(result["status"], json!("completed"));
    assert_eq!(result["execution_order"], json!(["s", "a", "e"]));
    assert_eq!(result["metadata"]["events"].as_array().unwrap().is_empty(), false);
}

#[tokio::test]
async fn diamond_skips_only_the_false_branch() {
    let result = run(json!({
        "id": "wf-diamond",
        "name": "diamond",
        "nodes": [
            {"id": "s", "type": "start", "name": "s"},
            {"id": "l", "type": "condition", "name": "l", "config": {"expression": "2>1"}},
            {"id": "r", "type": "condition", "name": "r", "config": {"expression": "2<1"}},
            {"id": "j", "type": "end", "name": "j"},
        ],
        "edges": [
            {"source": "s", "target": "l"},
            {"source": "s", "target": "r"},
            {"source": "l", "target": "j", "type": "condition", "condition": true},
            {"source": "r", "target": "j", "type": "condition", "condition": true},
        ],
    }))
    .await;

    assert_eq!(result["status"], json!("completed"));
    let skip_registry = result["metadata"]["skip_registry"].as_object().unwrap();
    assert!(skip_registry.is_empty(), "'j' is reachable via 'l' too and must not be skipped: {skip_registry:?}");
}

#[tokio::test]
async fn diamond_skips_node_reachable_only_through_false_branch() {
    let result = run(json!({
        "id": "wf-diamond-skip",
        "name": "diamond-skip",
        "nodes": [
            {"id": "s", "type": "start", "name": "s"},
            {"id": "r", "type": "condition", "name": "r", "config": {"expression": "2<1"}},
            {"id": "only_via_r", "type": "end", "name": "only_via_r"},
        ],
        "edges": [
            {"source": "s", "target": "r"},
            {"source": "r", "target": "only_via_r", "type": "condition", "condition": true},
        ],
    }))
    .await;

    assert_eq!(result["status"], json!("completed"));
    let skip_registry = result["metadata"]["skip_registry"].as_object().unwrap();
    let entry = skip_registry.get("only_via_r").expect("node only reachable via the untaken branch must be skipped");
    assert_eq!(entry["reason"], json!("condition_not_met"));
}

#[tokio::test]
async fn fork_of_three_paths_joins_with_merge_strategy() {
    let result = run(json!({
        "id": "wf-fork",
        "name": "fork",
        "nodes": [
            {"id": "s", "type": "start", "name": "s"},
            {"id": "fk", "type": "fork", "name": "fk"},
            {"id": "p1", "type": "path", "name": "p1", "config": {"condition": true}},
            {"id": "p2", "type": "path", "name": "p2", "config": {"condition": true}},
            {"id": "p3", "type": "path", "name": "p3", "config": {"condition": true}},
            {"id": "h1", "type": "http_request", "name": "h1", "config": {"url": "https://example.test/1"}},
            {"id": "h2", "type": "http_request", "name": "h2", "config": {"url": "https://example.test/2"}},
            {"id": "h3", "type": "http_request", "name": "h3", "config": {"url": "https://example.test/3"}},
            {"id": "jn", "type": "join", "name": "jn", "config": {"source": "fk", "strategy": "merge"}},
        ],
        "edges": [
            {"source": "s", "target": "fk"},
            {"source": "fk", "target": "p1", "type": "fork-branch"},
            {"source": "fk", "target": "p2", "type": "fork-branch"},
            {"source": "fk", "target": "p3", "type": "fork-branch"},
            {"source": "p1", "target": "h1"},
            {"source": "p2", "target": "h2"},
            {"source": "p3", "target": "h3"},
            {"source": "fk", "target": "jn"},
        ],
    }))
    .await;

    assert_eq!(result["status"], json!("completed"));

    let join_outputs = &result["metadata"]["steps"]["jn"]["outputs"];
    assert_eq!(join_outputs["strategy"], json!("merge"));
    assert_eq!(join_outputs["count"], json!(3));
    let aggregated = join_outputs["aggregated"].as_object().expect("merge aggregates into an object");
    for node_id in ["h1", "h2", "h3"] {
        assert!(aggregated.contains_key(node_id), "merge result missing '{node_id}': {aggregated:?}");
    }

    // `h1` is both inside `fk`'s own per-path subgraph run and a normal
    // member of the whole workflow's dependency levels; it must run exactly
    // once, not once from each.
    let h1_completions = result["metadata"]["events"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["node_id"] == json!("h1") && e["event_type"] == json!("node_completed"))
        .count();
    assert_eq!(h1_completions, 1, "node reachable through a fork path must not execute twice");
}

#[tokio::test]
async fn join_aggregates_all_three_forked_paths() {
    let registry = Arc::new(default_registry(Arc::new(StubHttpClient::new(200, json!({"ok": true})))));
    let wf = workflow(json!({
        "id": "wf-fork-join",
        "name": "fork-join",
        "nodes": [
            {"id": "s", "type": "start", "name": "s"},
            {"id": "fk", "type": "fork", "name": "fk"},
            {"id": "p1", "type": "path", "name": "p1", "config": {"condition": true}},
            {"id": "p2", "type": "path", "name": "p2", "config": {"condition": true}},
            {"id": "p3", "type": "path", "name": "p3", "config": {"condition": true}},
            {"id": "jn", "type": "join", "name": "jn", "config": {"source": "fk", "strategy": "count"}},
        ],
        "edges": [
            {"source": "s", "target": "fk"},
            {"source": "fk", "target": "p1", "type": "fork-branch"},
            {"source": "fk", "target": "p2", "type": "fork-branch"},
            {"source": "fk", "target": "p3", "type": "fork-branch"},
            {"source": "fk", "target": "jn"},
        ],
    }));

    let result = orchestrator::execute(wf, registry, None).await;
    assert_eq!(result["status"], json!("completed"));
    let join_outputs = &result["metadata"]["steps"]["jn"]["outputs"];
    assert_eq!(join_outputs["strategy"], json!("count"));
    assert_eq!(join_outputs["aggregated"], json!(3));
    assert_eq!(join_outputs["count"], json!(3));
}

#[tokio::test]
async fn fork_output_shape_reports_three_completed_paths() {
    let registry = Arc::new(default_registry(Arc::new(StubHttpClient::new(200, json!({"ok": true})))));
    let wf = workflow(json!({
        "id": "wf-fork-shape",
        "name": "fork-shape",
        "nodes": [
            {"id": "s", "type": "start", "name": "s"},
            {"id": "fk", "type": "fork", "name": "fk"},
            {"id": "p1", "type": "path", "name": "p1", "config": {"condition": true}},
            {"id": "p2", "type": "path", "name": "p2", "config": {"condition": true}},
            {"id": "p3", "type": "path", "name": "p3", "config": {"condition": true}},
        ],
        "edges": [
            {"source": "s", "target": "fk"},
            {"source": "fk", "target": "p1", "type": "fork-branch"},
            {"source": "fk", "target": "p2", "type": "fork-branch"},
            {"source": "fk", "target": "p3", "type": "fork-branch"},
        ],
    }));

    let result = orchestrator::execute(wf, registry, None).await;
    assert_eq!(result["status"], json!("completed"));

    let completed_ids: Vec<&str> = result["metadata"]["events"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["event_type"] == json!("node_completed"))
        .filter_map(|e| e["node_id"].as_str())
        .collect();
    for expected in ["p1", "p2", "p3", "jn"] {
        assert!(completed_ids.contains(&expected), "expected '{expected}' to complete, got {completed_ids:?}");
    }
}

#[tokio::test]
async fn parallel_honors_wait_for_completion_false_from_its_own_config() {
    let result = run(json!({
        "id": "wf-parallel-detached",
        "name": "parallel-detached",
        "nodes": [
            {"id": "s", "type": "start", "name": "s"},
            {"id": "pl", "type": "parallel", "name": "pl", "config": {"wait_for_completion": false}},
            {"id": "t1", "type": "action", "name": "t1", "config": {}},
            {"id": "t2", "type": "action", "name": "t2", "config": {}},
        ],
        "edges": [
            {"source": "s", "target": "pl"},
            {"source": "pl", "target": "t1"},
            {"source": "pl", "target": "t2"},
        ],
    }))
    .await;

    assert_eq!(result["status"], json!("completed"));
    let parallel_output = &result["metadata"]["steps"]["pl"]["outputs"];
    assert_eq!(
        parallel_output["status"], json!("started_in_background"),
        "parallel must read its own 'wait_for_completion: false' instead of always waiting: {parallel_output:?}"
    );
}

#[tokio::test]
async fn loop_runs_condition_child_once_per_item() {
    let result = run(json!({
        "id": "wf-loop",
        "name": "loop",
        "nodes": [
            {"id": "s", "type": "start", "name": "s"},
            {
                "id": "lp", "type": "loop", "name": "lp",
                "config": {
                    "items": ["x", "y", "z"],
                    "alias": "item",
                    "nodes": ["child"],
                },
            },
            {"id": "child", "type": "condition", "name": "child", "config": {"expression": "'{{ loop.item }}' == 'y'"}},
        ],
        "edges": [
            {"source": "s", "target": "lp"},
        ],
    }))
    .await;

    assert_eq!(result["status"], json!("completed"));
}

#[tokio::test]
async fn error_routes_around_success_edge_and_run_still_completes() {
    struct FailingClient;

    #[async_trait::async_trait]
    impl HttpClient for FailingClient {
        async fn request(
            &self,
            _method: &str,
            _url: &str,
            _headers: serde_json::Map<String, Value>,
            _body: Option<Value>,
        ) -> Result<HttpResponse, String> {
            Err("connection refused".to_string())
        }
    }

    let registry = Arc::new(default_registry(Arc::new(FailingClient)));
    let wf = workflow(json!({
        "id": "wf-error-routing",
        "name": "error-routing",
        "nodes": [
            {"id": "s", "type": "start", "name": "s"},
            {"id": "a", "type": "http_request", "name": "a", "config": {"url": "https://example.test/fails"}},
            {"id": "b", "type": "end", "name": "b"},
            {"id": "c", "type": "end", "name": "c"},
        ],
        "edges": [
            {"source": "s", "target": "a"},
            {"source": "a", "target": "b", "type": "error"},
            {"source": "a", "target": "c", "type": "success"},
        ],
    }));

    let result = orchestrator::execute(wf, registry, None).await;

    assert_eq!(result["status"], json!("completed"));
    let skip_registry = result["metadata"]["skip_registry"].as_object().unwrap();
    let entry = skip_registry.get("c").expect("the success-typed sibling of the taken error edge must be skipped");
    assert_eq!(entry["reason"], json!("success_edge_not_taken"));
}

#[tokio::test]
async fn cycle_is_rejected_before_scheduling_any_node() {
    let result = run(json!({
        "id": "wf-cycle",
        "name": "cycle",
        "nodes": [
            {"id": "start", "type": "start", "name": "start"},
            {"id": "a", "type": "action", "name": "a", "config": {}},
            {"id": "b", "type": "action", "name": "b", "config": {}},
            {"id": "c", "type": "action", "name": "c", "config": {}},
        ],
        "edges": [
            {"source": "start", "target": "a"},
            {"source": "a", "target": "b"},
            {"source": "b", "target": "c"},
            {"source": "c", "target": "a"},
        ],
    }))
    .await;

    assert_eq!(result["status"], json!("failed"));
    assert_eq!(result["error"]["type"], json!("ValidationFailed"));
    assert!(result["error"]["message"].as_str().unwrap().to_lowercase().contains("cycle"));
    assert_eq!(result["execution_order"], json!([]));
}
