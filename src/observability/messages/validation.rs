// SPDX-License-Identifier: MIT

//! Messages for the validator (§4.2).

use super::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

pub struct ValidationFailed<'a> {
    pub workflow_id: &'a str,
    pub error_count: usize,
}

impl Display for ValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "workflow '{}' failed validation with {} error(s)", self.workflow_id, self.error_count)
    }
}

impl StructuredLog for ValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(workflow_id = self.workflow_id, error_count = self.error_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("validation_failed", span_name = name, workflow_id = self.workflow_id)
    }
}

pub struct ValidationWarning<'a> {
    pub workflow_id: &'a str,
    pub message: &'a str,
}

impl Display for ValidationWarning<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "workflow '{}': {}", self.workflow_id, self.message)
    }
}

impl StructuredLog for ValidationWarning<'_> {
    fn log(&self) {
        tracing::warn!(workflow_id = self.workflow_id, message = self.message, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("validation_warning", span_name = name, workflow_id = self.workflow_id)
    }
}

pub struct ValidationPassed<'a> {
    pub workflow_id: &'a str,
    pub warning_count: usize,
}

impl Display for ValidationPassed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "workflow '{}' passed validation with {} warning(s)", self.workflow_id, self.warning_count)
    }
}

impl StructuredLog for ValidationPassed<'_> {
    fn log(&self) {
        tracing::info!(workflow_id = self.workflow_id, warning_count = self.warning_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("validation_passed", span_name = name, workflow_id = self.workflow_id)
    }
}
