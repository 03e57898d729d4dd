//! Processor model.
//!
//! Processors form a flat set of interchangeable cores. Each one is either
//! idle or running exactly one job.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Job;

/// Index of a processor in the scheduler's processor set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProcessorId(pub usize);

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPU{}", self.0)
    }
}

/// A processor and the job currently running on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Processor {
    /// Processor identifier.
    pub id: ProcessorId,
    /// Human-readable name.
    pub name: String,
    running: Option<Job>,
}

impl Processor {
    /// Creates an idle processor.
    pub fn new(id: usize) -> Self {
        Self {
            id: ProcessorId(id),
            name: format!("CPU {id}"),
            running: None,
        }
    }

    /// Sets the processor name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The running job, if any.
    pub fn running(&self) -> Option<&Job> {
        self.running.as_ref()
    }

    /// Whether nothing is running.
    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    /// Puts `job` on the processor and returns the job it displaced.
    pub(crate) fn start(&mut self, job: Job) -> Option<Job> {
        self.running.replace(job)
    }

    /// Removes and returns the running job.
    pub(crate) fn release(&mut self) -> Option<Job> {
        self.running.take()
    }
}
