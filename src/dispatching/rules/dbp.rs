//! Distance-Based Priority.
//!
//! Jobs of the task closest to violating its (m,k) contract run first.
//! The policy owns one outcome history per task and updates it on every
//! job termination.
//!
//! # Reference
//! Goossens (2008), "(m,k)-firm constraints and DBP scheduling: impact of
//! the initial k-sequence and exact schedulability test", RTNS 2008

use std::sync::Arc;

use crate::dispatching::PriorityPolicy;
use crate::history::{Distance, HistoryTracker};
use crate::models::{Job, Task};

/// Distance-based priority, mandatory before optional.
///
/// Priority key: `(optional, distance, absolute deadline, period)`.
/// Least distance (least slack) is most urgent; ties fall back to EDF,
/// then to RMS.
#[derive(Debug, Clone, Default)]
pub struct MkDbp {
    histories: HistoryTracker,
}

impl MkDbp {
    /// Creates the policy with no tracked tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current distance of `task`, initializing its history if needed.
    pub fn distance(&mut self, task: &Task) -> Distance {
        self.histories.distance(task)
    }

    /// The per-task histories.
    pub fn histories(&self) -> &HistoryTracker {
        &self.histories
    }
}

impl PriorityPolicy for MkDbp {
    type Key = (bool, Distance, i64, i64);
    type Eviction = Distance;

    fn name(&self) -> &'static str {
        "MK_DBP"
    }

    fn init(&mut self, tasks: &[Arc<Task>]) {
        for task in tasks {
            self.histories.init_task(task);
        }
    }

    fn priority_key(&mut self, job: &Job) -> Self::Key {
        (
            job.is_optional(),
            self.histories.distance(&job.task),
            job.absolute_deadline,
            job.period(),
        )
    }

    fn eviction_key(&mut self, running: &Job) -> Self::Eviction {
        self.histories.distance(&running.task)
    }

    fn record_outcome(&mut self, job: &Job) {
        self.histories
            .record_outcome(&job.task, job.met_deadline());
    }

    fn description(&self) -> &'static str {
        "Distance-Based Priority for (m,k)-firm streams"
    }
}
