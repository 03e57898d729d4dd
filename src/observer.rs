//! Decision observers.
//!
//! The scheduler reports every dispatch decision (and every candidate it
//! declined to run) to an observer. The default observer does nothing;
//! [`TracingObserver`] turns decisions into `tracing` events and
//! [`RecordingObserver`] keeps them in memory.

use tracing::{info, trace};

use crate::models::{Job, JobId, ProcessorId};
use crate::scheduler::Dispatch;

/// Receives scheduling decisions as they are made.
pub trait SchedulerObserver {
    /// A job was dispatched to a processor.
    fn on_dispatch(&mut self, policy: &'static str, dispatch: &Dispatch);

    /// The best ready job was not allowed to run on the selected processor.
    fn on_decline(&mut self, _policy: &'static str, _candidate: &Job, _target: ProcessorId) {}
}

/// Ignores all decisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SchedulerObserver for NoopObserver {
    fn on_dispatch(&mut self, _policy: &'static str, _dispatch: &Dispatch) {}
}

/// Emits an `info` event per dispatch and a `trace` event per decline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SchedulerObserver for TracingObserver {
    fn on_dispatch(&mut self, policy: &'static str, dispatch: &Dispatch) {
        info!(
            policy,
            job = %dispatch.job,
            task = %dispatch.job.task_id(),
            processor = %dispatch.processor,
            preempted = ?dispatch.preempted.as_ref().map(|job| job.id),
            "dispatch"
        );
    }

    fn on_decline(&mut self, policy: &'static str, candidate: &Job, target: ProcessorId) {
        trace!(policy, job = %candidate, processor = %target, "declined");
    }
}

/// One recorded decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// `job` started on `processor`, displacing `preempted`.
    Dispatched {
        job: JobId,
        processor: ProcessorId,
        preempted: Option<JobId>,
    },
    /// `job` was not allowed onto `processor`.
    Declined { job: JobId, processor: ProcessorId },
}

/// Keeps every decision in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// Decisions, oldest first.
    pub decisions: Vec<Decision>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the dispatch decisions.
    pub fn dispatches(&self) -> impl Iterator<Item = &Decision> {
        self.decisions
            .iter()
            .filter(|d| matches!(d, Decision::Dispatched { .. }))
    }
}

impl SchedulerObserver for RecordingObserver {
    fn on_dispatch(&mut self, _policy: &'static str, dispatch: &Dispatch) {
        self.decisions.push(Decision::Dispatched {
            job: dispatch.job.id,
            processor: dispatch.processor,
            preempted: dispatch.preempted.as_ref().map(|job| job.id),
        });
    }

    fn on_decline(&mut self, _policy: &'static str, candidate: &Job, target: ProcessorId) {
        self.decisions.push(Decision::Declined {
            job: candidate.id,
            processor: target,
        });
    }
}
