//! JSON configuration for a scheduler and its task set.
//!
//! ```json
//! {
//!   "policy": "dbp",
//!   "processors": 1,
//!   "tasks": [
//!     { "id": 1, "period": 10, "m": 2, "k": 4, "initial_k_sequence": "1010" },
//!     { "id": 2, "period": 20, "deadline": 15, "criticality": "optional" }
//!   ]
//! }
//! ```
//!
//! Missing or non-numeric `m`/`k` fall back to 1. Structural problems
//! (bad JSON, missing `id`/`period`) are reported as [`ConfigError`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::dispatching::PolicyKind;
use crate::history::SeedSequence;
use crate::models::{Criticality, Firmness, Task, TaskId};
use crate::observer::{NoopObserver, TracingObserver};
use crate::scheduler::{build_scheduler, RealTimeScheduler};
use crate::validation::{validate_tasks, ValidationError};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON or misses required fields.
    #[error("failed to parse scheduler configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The task set failed validation.
    #[error("invalid task set: {}", join(.0))]
    Invalid(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One task entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Task identifier.
    pub id: u32,
    /// Display name. Defaults to `T<id>`.
    #[serde(default)]
    pub name: Option<String>,
    /// Activation period.
    pub period: i64,
    /// Relative deadline. Defaults to the period.
    #[serde(default)]
    pub deadline: Option<i64>,
    /// Required successes per window.
    #[serde(default = "default_count", deserialize_with = "lenient_count")]
    pub m: i64,
    /// Window length.
    #[serde(default = "default_count", deserialize_with = "lenient_count")]
    pub k: i64,
    /// Initial outcome history.
    #[serde(default)]
    pub initial_k_sequence: Option<SeedSequence>,
    /// Default criticality of the task's jobs.
    #[serde(default)]
    pub criticality: Criticality,
}

impl TaskConfig {
    /// Converts the entry to a task.
    pub fn to_task(&self) -> Task {
        Task {
            id: TaskId(self.id),
            name: self.name.clone().unwrap_or_else(|| format!("T{}", self.id)),
            period: self.period,
            relative_deadline: self.deadline.unwrap_or(self.period),
            firmness: Firmness::new(self.m, self.k),
            criticality: self.criticality,
            initial_sequence: self.initial_k_sequence.clone(),
        }
    }
}

/// Scheduler configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Priority policy.
    #[serde(default)]
    pub policy: PolicyKind,
    /// Number of processors (at least one).
    #[serde(default = "default_processors")]
    pub processors: usize,
    /// Emit a `tracing` event per scheduling decision.
    #[serde(default)]
    pub trace_decisions: bool,
    /// Task set.
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

impl SchedulerConfig {
    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    /// The configured tasks.
    pub fn tasks(&self) -> Vec<Arc<Task>> {
        self.tasks.iter().map(|t| Arc::new(t.to_task())).collect()
    }

    /// Validates the task set and builds the configured scheduler.
    ///
    /// The returned scheduler still needs [`RealTimeScheduler::init`].
    pub fn build(&self) -> Result<Box<dyn RealTimeScheduler>, ConfigError> {
        let tasks = self.tasks();
        validate_tasks(tasks.iter().map(|t| t.as_ref())).map_err(ConfigError::Invalid)?;

        let processors = self.processors.max(1);
        Ok(if self.trace_decisions {
            build_scheduler(self.policy, tasks, processors, TracingObserver)
        } else {
            build_scheduler(self.policy, tasks, processors, NoopObserver)
        })
    }
}

fn default_count() -> i64 {
    1
}

fn default_processors() -> usize {
    1
}

/// Accepts integers, floats (truncated) and numeric strings; anything
/// else becomes 1.
fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_else(default_count),
        Value::String(s) => s.trim().parse().unwrap_or_else(|_| default_count()),
        _ => default_count(),
    })
}
