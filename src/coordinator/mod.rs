// SPDX-License-Identifier: MIT

//! Mediator between the orchestrator and node executors (§4.6): skip
//! registry, append-only event log, per-node state map, and halt flag.
//!
//! Holds its own exclusive lock, independent of the evaluation context's
//! lock. Lock order, when both are needed: context first, then coordinator
//! (never the reverse) — see §5.

use crate::context::EvaluationContext;
use crate::model::{Event, EventType, NodeState, SkipEntry, StepRecord};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct CoordinatorState {
    skip_registry: HashMap<String, SkipEntry>,
    node_states: HashMap<String, NodeState>,
    events: Vec<Event>,
    halted: bool,
    halt_reason: Option<String>,
}

/// Shared handle; cheap to clone, every clone shares the same lock and the
/// same [`EvaluationContext`].
#[derive(Debug, Clone)]
pub struct Coordinator {
    context: EvaluationContext,
    state: Arc<Mutex<CoordinatorState>>,
}

impl Coordinator {
    pub fn new(context: EvaluationContext) -> Self {
        Self { context, state: Arc::new(Mutex::new(CoordinatorState::default())) }
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.context
    }

    pub async fn mark_node_skipped(&self, node_id: &str, entry: SkipEntry) {
        let mut state = self.state.lock().await;
        state.skip_registry.insert(node_id.to_string(), entry);
        state.node_states.insert(node_id.to_string(), NodeState::Skipped);
    }

    pub async fn is_node_skipped(&self, node_id: &str) -> (bool, Option<SkipEntry>) {
        let state = self.state.lock().await;
        match state.skip_registry.get(node_id) {
            Some(entry) => (true, Some(entry.clone())),
            None => (false, None),
        }
    }

    /// A snapshot of every skip entry recorded so far (§B "Structured run
    /// summary"): lets a caller inspect *why* a node was skipped after the
    /// run completes, beyond the terminal success/failure shape.
    pub async fn skip_registry_snapshot(&self) -> HashMap<String, SkipEntry> {
        self.state.lock().await.skip_registry.clone()
    }

    /// Reverses an earlier [`Coordinator::mark_node_skipped`] — used when a
    /// later-discovered live path reaches a node that an independent
    /// decision point had marked skipped (§4.9 diamond reconciliation, see
    /// `executor::lifecycle::reconcile_skips`). A no-op if the node isn't
    /// currently marked skipped.
    pub async fn unmark_node_skipped(&self, node_id: &str) {
        let mut state = self.state.lock().await;
        if state.skip_registry.remove(node_id).is_some() {
            state.node_states.remove(node_id);
        }
    }

    pub async fn set_node_state(&self, node_id: &str, node_state: NodeState) {
        let mut state = self.state.lock().await;
        state.node_states.insert(node_id.to_string(), node_state);
    }

    pub async fn get_node_state(&self, node_id: &str) -> Option<NodeState> {
        let state = self.state.lock().await;
        state.node_states.get(node_id).copied()
    }

    pub async fn record_event(&self, event_type: EventType, node_id: Option<String>, data: Value) {
        let mut state = self.state.lock().await;
        state.events.push(Event::new(event_type, node_id, data));
    }

    /// Returns every recorded event, optionally filtered by type.
    pub async fn get_events(&self, filter: Option<EventType>) -> Vec<Event> {
        let state = self.state.lock().await;
        match filter {
            Some(ty) => state.events.iter().filter(|e| e.event_type == ty).cloned().collect(),
            None => state.events.clone(),
        }
    }

    pub async fn halt_workflow(&self, reason: impl Into<String>) {
        let reason = reason.into();
        {
            let mut state = self.state.lock().await;
            state.halted = true;
            state.halt_reason = Some(reason.clone());
        }
        self.record_event(EventType::WorkflowHaltRequested, None, json!({ "reason": reason })).await;
    }

    pub async fn should_halt(&self) -> bool {
        self.state.lock().await.halted
    }

    pub async fn halt_reason(&self) -> Option<String> {
        self.state.lock().await.halt_reason.clone()
    }

    /// Delegates to the context's step record for the node's `inputs` (§4.6:
    /// "delegating to the context's step records").
    pub async fn set_node_input(&self, node_id: &str, inputs: Value) {
        let mut record = self.context.get_step(node_id).await.unwrap_or_default();
        record.inputs = inputs;
        self.context.set_step(node_id, record).await;
    }

    pub async fn get_node_input(&self, node_id: &str) -> Option<Value> {
        self.context.get_step(node_id).await.map(|r| r.inputs)
    }

    pub async fn set_node_output(&self, node_id: &str, outputs: Value) {
        let mut record = self.context.get_step(node_id).await.unwrap_or_default();
        record.outputs = outputs;
        self.context.set_step(node_id, record).await;
    }

    pub async fn get_node_output(&self, node_id: &str) -> Option<Value> {
        self.context.get_step(node_id).await.map(|r| r.outputs)
    }

    pub async fn set_node_step(&self, node_id: &str, record: StepRecord) {
        self.context.set_step(node_id, record).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn skip_then_check_round_trips() {
        let coordinator = Coordinator::new(EvaluationContext::new());
        coordinator.mark_node_skipped("n1", SkipEntry::new("condition_not_met")).await;
        let (skipped, entry) = coordinator.is_node_skipped("n1").await;
        assert!(skipped);
        assert_eq!(entry.unwrap().reason, "condition_not_met");
        assert_eq!(coordinator.get_node_state("n1").await, Some(NodeState::Skipped));
    }

    #[tokio::test]
    async fn halt_workflow_is_observed() {
        let coordinator = Coordinator::new(EvaluationContext::new());
        assert!(!coordinator.should_halt().await);
        coordinator.halt_workflow("operator requested stop").await;
        assert!(coordinator.should_halt().await);
        assert_eq!(coordinator.halt_reason().await, Some("operator requested stop".to_string()));
    }

    #[tokio::test]
    async fn events_filter_by_type() {
        let coordinator = Coordinator::new(EvaluationContext::new());
        coordinator.record_event(EventType::NodeStarted, Some("n1".to_string()), json!({})).await;
        coordinator.record_event(EventType::NodeCompleted, Some("n1".to_string()), json!({})).await;
        let started = coordinator.get_events(Some(EventType::NodeStarted)).await;
        assert_eq!(started.len(), 1);
        assert_eq!(coordinator.get_events(None).await.len(), 2);
    }

    #[tokio::test]
    async fn node_output_delegates_to_context_step_record() {
        let coordinator = Coordinator::new(EvaluationContext::new());
        coordinator.set_node_output("n1", json!({"result": 42})).await;
        assert_eq!(coordinator.get_node_output("n1").await, Some(json!({"result": 42})));
    }
}
