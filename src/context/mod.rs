// SPDX-License-Identifier: MIT

//! The evaluation context (§4.3): a concurrency-safe, hierarchical state
//! store shared by every node executor during a run.
//!
//! Nine named sections (`variables`, `steps`, `lookup`, `inputs`, `loop`,
//! `outputs`, `metadata`, `current`, `system`) live behind one
//! [`tokio::sync::Mutex`], plus a private area for the skip registry and an
//! orchestrator back-reference that never appears in a `state` read. Every
//! getter returns a deep copy (`serde_json::Value::clone`, which is already
//! structurally independent) so callers can never mutate shared state by
//! holding onto a read result.

mod section;

pub use section::Section;

use crate::errors::TemplateError;
use crate::model::{LoopFrame, StepRecord};
use crate::template::render_value;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct ContextState {
    variables: Map<String, Value>,
    steps: Map<String, Value>,
    lookup: Map<String, Value>,
    inputs: Map<String, Value>,
    loop_frame: Map<String, Value>,
    outputs: Map<String, Value>,
    metadata: Map<String, Value>,
    current: Map<String, Value>,
    system: Map<String, Value>,
}

impl ContextState {
    fn section_mut(&mut self, section: Section) -> &mut Map<String, Value> {
        match section {
            Section::Variables => &mut self.variables,
            Section::Steps => &mut self.steps,
            Section::Lookup => &mut self.lookup,
            Section::Inputs => &mut self.inputs,
            Section::Loop => &mut self.loop_frame,
            Section::Outputs => &mut self.outputs,
            Section::Metadata => &mut self.metadata,
            Section::Current => &mut self.current,
            Section::System => &mut self.system,
        }
    }

    fn section(&self, section: Section) -> &Map<String, Value> {
        match section {
            Section::Variables => &self.variables,
            Section::Steps => &self.steps,
            Section::Lookup => &self.lookup,
            Section::Inputs => &self.inputs,
            Section::Loop => &self.loop_frame,
            Section::Outputs => &self.outputs,
            Section::Metadata => &self.metadata,
            Section::Current => &self.current,
            Section::System => &self.system,
        }
    }

    /// The full state as a single JSON object, used as the template
    /// engine's rendering environment.
    fn as_value(&self) -> Value {
        let mut root = Map::new();
        root.insert("variables".to_string(), Value::Object(self.variables.clone()));
        root.insert("steps".to_string(), Value::Object(self.steps.clone()));
        root.insert("lookup".to_string(), Value::Object(self.lookup.clone()));
        root.insert("inputs".to_string(), Value::Object(self.inputs.clone()));
        root.insert("loop".to_string(), Value::Object(self.loop_frame.clone()));
        root.insert("outputs".to_string(), Value::Object(self.outputs.clone()));
        root.insert("metadata".to_string(), Value::Object(self.metadata.clone()));
        root.insert("current".to_string(), Value::Object(self.current.clone()));
        root.insert("system".to_string(), Value::Object(self.system.clone()));
        Value::Object(root)
    }
}

/// Handle to the shared evaluation context. Cheap to clone; every clone
/// shares the same underlying lock.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    inner: Arc<Mutex<ContextState>>,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(ContextState::default())) }
    }

    /// Seeds `variables` and `system` at run start (§4.10 step 1).
    pub async fn seed(&self, variables: Map<String, Value>, system: Map<String, Value>) {
        let mut state = self.inner.lock().await;
        state.variables = variables;
        state.system = system;
    }

    /// Deep-copy read of an entire section.
    pub async fn get_section(&self, section: Section) -> Value {
        let state = self.inner.lock().await;
        Value::Object(state.section(section).clone())
    }

    /// Deep-copy read of one key within a section.
    pub async fn get(&self, section: Section, key: &str) -> Option<Value> {
        let state = self.inner.lock().await;
        state.section(section).get(key).cloned()
    }

    pub async fn set(&self, section: Section, key: impl Into<String>, value: Value) -> Value {
        let mut state = self.inner.lock().await;
        state.section_mut(section).insert(key.into(), value);
        Value::Object(state.section(section).clone())
    }

    /// Merges `patch`'s keys into the section rather than replacing it.
    pub async fn update(&self, section: Section, patch: Map<String, Value>) -> Value {
        let mut state = self.inner.lock().await;
        state.section_mut(section).extend(patch);
        Value::Object(state.section(section).clone())
    }

    pub async fn delete(&self, section: Section, key: &str) -> Value {
        let mut state = self.inner.lock().await;
        state.section_mut(section).remove(key);
        Value::Object(state.section(section).clone())
    }

    pub async fn clear(&self, section: Section) {
        let mut state = self.inner.lock().await;
        state.section_mut(section).clear();
    }

    /// Writes a node's completed step record, keyed by node id, into
    /// `steps`.
    pub async fn set_step(&self, node_id: &str, record: StepRecord) {
        let value = serde_json::to_value(record).expect("StepRecord always serializes");
        let mut state = self.inner.lock().await;
        state.steps.insert(node_id.to_string(), value);
    }

    pub async fn get_step(&self, node_id: &str) -> Option<StepRecord> {
        let state = self.inner.lock().await;
        state.steps.get(node_id).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Installs the loop frame for the duration of one iteration (§4.9
    /// `loop`). `loop.<alias>` is exposed alongside `loop.item`.
    pub async fn set_loop_frame(&self, frame: &LoopFrame) {
        let value = frame.to_value();
        let mut state = self.inner.lock().await;
        state.loop_frame = value.as_object().cloned().unwrap_or_default();
    }

    pub async fn clear_loop_frame(&self) {
        self.clear(Section::Loop).await;
    }

    /// Recursively renders every string in `value` through the template
    /// engine against the current full state (§4.3).
    ///
    /// Maps and lists are rebuilt with rendered children; scalars other than
    /// strings pass through unchanged.
    pub async fn evaluate_expression(&self, value: &Value) -> Result<Value, TemplateError> {
        let env = {
            let state = self.inner.lock().await;
            state.as_value()
        };
        render_value(value, &env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let ctx = EvaluationContext::new();
        ctx.set(Section::Variables, "name", json!("ada")).await;
        let got = ctx.get(Section::Variables, "name").await;
        assert_eq!(got, Some(json!("ada")));
    }

    #[tokio::test]
    async fn deep_copy_read_is_independent() {
        let ctx = EvaluationContext::new();
        ctx.set(Section::Variables, "items", json!([1, 2, 3])).await;
        let mut copy = ctx.get(Section::Variables, "items").await.unwrap();
        copy.as_array_mut().unwrap().push(json!(4));
        let fresh = ctx.get(Section::Variables, "items").await.unwrap();
        assert_eq!(fresh, json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn evaluate_expression_renders_nested_templates() {
        let ctx = EvaluationContext::new();
        ctx.set(Section::Variables, "name", json!("ada")).await;
        let rendered = ctx
            .evaluate_expression(&json!({"greeting": "hello {{ variables.name }}", "n": 3}))
            .await
            .unwrap();
        assert_eq!(rendered["greeting"], json!("hello ada"));
        assert_eq!(rendered["n"], json!(3));
    }

    #[tokio::test]
    async fn loop_frame_is_visible_under_its_alias() {
        let ctx = EvaluationContext::new();
        let frame = LoopFrame::new(json!("x"), "item_alias", 0, 2);
        ctx.set_loop_frame(&frame).await;
        let rendered = ctx.evaluate_expression(&json!("{{ loop.item_alias }}")).await.unwrap();
        assert_eq!(rendered, json!("x"));
        ctx.clear_loop_frame().await;
        let empty = ctx.get_section(Section::Loop).await;
        assert_eq!(empty, json!({}));
    }
}
