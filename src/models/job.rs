//! Job (task instance) model.
//!
//! A job is one activation of a [`Task`]. The host engine creates it on
//! activation and drops it on termination; the core keeps short-lived
//! copies in its ready list and on processors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{Criticality, ProcessorId, Task, TaskId};

/// Identifier of a job, unique among live jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{}", self.0)
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobState {
    /// Activated, waiting for a processor.
    #[default]
    Ready,
    /// Dispatched to a processor.
    Running,
    /// Terminated (completed or aborted).
    Finished,
}

/// Deadline outcome of a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Completed by its absolute deadline.
    Met,
    /// Exceeded its absolute deadline.
    Missed,
}

impl Outcome {
    /// Builds an outcome from a "met deadline" flag.
    pub fn from_met(met_deadline: bool) -> Self {
        if met_deadline {
            Outcome::Met
        } else {
            Outcome::Missed
        }
    }
}

/// One activation of a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Job identifier.
    pub id: JobId,
    /// The task this job instantiates.
    pub task: Arc<Task>,
    /// Activation time.
    pub activation: i64,
    /// Activation time + relative deadline.
    pub absolute_deadline: i64,
    /// Criticality of this instance (defaults to the task's).
    pub criticality: Criticality,
    /// Processor the job was activated on.
    pub cpu: ProcessorId,
    /// Lifecycle state.
    pub state: JobState,
    /// Deadline outcome, set once the job finishes.
    pub outcome: Option<Outcome>,
}

impl Job {
    /// Activates a job of `task` at time `activation` on processor 0.
    pub fn activate(id: u64, task: &Arc<Task>, activation: i64) -> Self {
        Self {
            id: JobId(id),
            task: Arc::clone(task),
            activation,
            absolute_deadline: activation + task.relative_deadline,
            criticality: task.criticality,
            cpu: ProcessorId(0),
            state: JobState::Ready,
            outcome: None,
        }
    }

    /// Sets the designated processor.
    pub fn on_processor(mut self, cpu: usize) -> Self {
        self.cpu = ProcessorId(cpu);
        self
    }

    /// Overrides the criticality of this instance.
    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = criticality;
        self
    }

    /// Marks this instance optional.
    pub fn optional(self) -> Self {
        self.with_criticality(Criticality::Optional)
    }

    /// Marks this instance mandatory.
    pub fn mandatory(self) -> Self {
        self.with_criticality(Criticality::Mandatory)
    }

    /// Overrides the absolute deadline.
    pub fn with_absolute_deadline(mut self, absolute_deadline: i64) -> Self {
        self.absolute_deadline = absolute_deadline;
        self
    }

    /// Marks the job finished with the given outcome.
    pub fn finish(mut self, outcome: Outcome) -> Self {
        self.state = JobState::Finished;
        self.outcome = Some(outcome);
        self
    }

    /// Identifier of the parent task.
    pub fn task_id(&self) -> TaskId {
        self.task.id
    }

    /// Period of the parent task.
    pub fn period(&self) -> i64 {
        self.task.period
    }

    /// Whether this instance is mandatory.
    pub fn is_mandatory(&self) -> bool {
        self.criticality.is_mandatory()
    }

    /// Whether this instance is optional.
    pub fn is_optional(&self) -> bool {
        self.criticality.is_optional()
    }

    /// Whether the job met its deadline. A job without a recorded
    /// outcome counts as met.
    pub fn met_deadline(&self) -> bool {
        self.outcome != Some(Outcome::Missed)
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.task.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_inherits_task() {
        let task = Arc::new(Task::new(1, 10).with_deadline(8).optional());
        let job = Job::activate(7, &task, 100);

        assert_eq!(job.id, JobId(7));
        assert_eq!(job.task_id(), TaskId(1));
        assert_eq!(job.absolute_deadline, 108);
        assert_eq!(job.period(), 10);
        assert!(job.is_optional());
        assert_eq!(job.cpu, ProcessorId(0));
        assert_eq!(job.state, JobState::Ready);
        assert!(job.outcome.is_none());
    }

    #[test]
    fn test_instance_criticality_override() {
        let task = Arc::new(Task::new(1, 10).optional());
        let job = Job::activate(1, &task, 0).mandatory().on_processor(2);
        assert!(job.is_mandatory());
        assert_eq!(job.cpu, ProcessorId(2));
    }

    #[test]
    fn test_outcome() {
        let task = Arc::new(Task::new(1, 10));
        let job = Job::activate(1, &task, 0);
        assert!(job.met_deadline());

        let missed = job.clone().finish(Outcome::Missed);
        assert_eq!(missed.state, JobState::Finished);
        assert!(!missed.met_deadline());

        assert!(job.finish(Outcome::from_met(true)).met_deadline());
    }
}
