//! Structured input for operations that create threads, tasks and steps.
//!
//! These types map directly to the TOML/JSON files a caller hands to the
//! engine and are deserialized via `serde`. Every field except completion
//! flags is required; [`TaskSpec::validate`] and [`ThreadSpec::validate`]
//! reject input the serializer could not represent faithfully.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::model::{Classification, Operation};

/// A step under a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepSpec {
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl StepSpec {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            completed: false,
        }
    }
}

/// A complete task: title, all metadata fields and its steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSpec {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub classification: Classification,
    pub entrypoint: String,
    pub observable: String,
    pub evidence: String,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// A complete thread with its introduction and tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadSpec {
    pub title: String,
    /// Free text; blank lines around it are not preserved.
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

/// Reject empty or multi-line values for single-line fields.
pub(crate) fn check_line(op: Operation, field: &str, value: &str) -> Result<(), PlanError> {
    if value.trim().is_empty() {
        return Err(PlanError::malformed(op, field, "required value is empty"));
    }
    if value.contains('\n') || value.contains('\r') {
        return Err(PlanError::malformed(
            op,
            field,
            "value must fit on a single line",
        ));
    }
    Ok(())
}

impl StepSpec {
    pub fn validate(&self, op: Operation, path: &str) -> Result<(), PlanError> {
        check_line(op, &format!("{path}.description"), &self.description)
    }
}

impl TaskSpec {
    /// Validate every required field. `path` prefixes field names in errors
    /// (empty for a top-level task).
    pub fn validate(&self, op: Operation, path: &str) -> Result<(), PlanError> {
        let field = |name: &str| {
            if path.is_empty() {
                name.to_owned()
            } else {
                format!("{path}.{name}")
            }
        };
        check_line(op, &field("title"), &self.title)?;
        check_line(op, &field("entrypoint"), &self.entrypoint)?;
        check_line(op, &field("observable"), &self.observable)?;
        check_line(op, &field("evidence"), &self.evidence)?;
        for (idx, step) in self.steps.iter().enumerate() {
            step.validate(op, &field(&format!("steps[{idx}]")))?;
        }
        Ok(())
    }
}

impl ThreadSpec {
    pub fn validate(&self, op: Operation) -> Result<(), PlanError> {
        check_line(op, "title", &self.title)?;

        let mut fences = 0usize;
        for line in self.introduction.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") {
                fences += 1;
                continue;
            }
            if fences % 2 == 1 {
                continue;
            }
            if line.starts_with("## ") || line.starts_with("### ") {
                return Err(PlanError::malformed(
                    op,
                    "introduction",
                    format!("line {line:?} would be read as a heading"),
                ));
            }
        }
        if fences % 2 == 1 {
            return Err(PlanError::malformed(
                op,
                "introduction",
                "code fence is never closed",
            ));
        }

        for (idx, task) in self.tasks.iter().enumerate() {
            task.validate(op, &format!("tasks[{idx}]"))?;
        }
        Ok(())
    }
}
