//! The scheduling framework and its engine-facing callback contract.
//!
//! A host simulation engine drives the scheduler through four callbacks:
//!
//! | Callback | When | Returns |
//! |----------|------|---------|
//! | `init` | once, before any job activity | nothing |
//! | `on_activate` | a job became ready | processor to reschedule |
//! | `on_terminated` | a ready or running job finished | processor to reschedule, if any |
//! | `schedule` | a scheduling opportunity on a processor | dispatch decision, if any |
//!
//! The core never advances time nor executes jobs; it only decides.
//!
//! # References
//!
//! - Chéramy et al. (2014), "SimSo: A Simulation Tool to Evaluate
//!   Real-Time Multiprocessor Scheduling Algorithms"

mod framework;
mod kpi;

pub use framework::{preemption_allowed, MkScheduler};
pub use kpi::{FirmnessKpi, TaskFirmnessStats};

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::dispatching::rules::{MkDbp, MkEdf, MkRms};
use crate::dispatching::PolicyKind;
use crate::models::{Job, Processor, ProcessorId, Task};
use crate::observer::SchedulerObserver;

/// A dispatch decision: start `job` on `processor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispatch {
    /// The job to run.
    pub job: Job,
    /// The processor to run it on.
    pub processor: ProcessorId,
    /// The job displaced from `processor`, now back in the ready list.
    pub preempted: Option<Job>,
}

/// Callback contract between a simulation engine and a scheduler.
///
/// Calls must be serialized. Within one simulated instant, each call sees
/// the ready list and processor state left by the previous call.
pub trait RealTimeScheduler: Send + Debug {
    /// Name of the active policy.
    fn policy_name(&self) -> &'static str;

    /// One-time setup; builds per-task state for the configured tasks.
    fn init(&mut self);

    /// Adds `job` to the ready list and returns the processor on which a
    /// scheduling opportunity should be requested.
    fn on_activate(&mut self, job: Job) -> ProcessorId;

    /// Records the outcome of `job` and forgets it.
    ///
    /// Returns the processor freed by the job, or `None` if the job was
    /// still waiting in the ready list.
    fn on_terminated(&mut self, job: &Job) -> Option<ProcessorId>;

    /// Makes a scheduling decision on behalf of `processor`.
    ///
    /// The decision may target another processor (an idle one, or the one
    /// running the least urgent job). A returned dispatch is final.
    fn schedule(&mut self, processor: ProcessorId) -> Option<Dispatch>;

    /// Jobs activated but not running, in activation order.
    fn ready_jobs(&self) -> &[Job];

    /// The processor set.
    fn processors(&self) -> &[Processor];

    /// Outcome statistics collected so far.
    fn kpi(&self) -> &FirmnessKpi;
}

/// Builds a boxed scheduler for a runtime-selected policy.
pub fn build_scheduler<O>(
    kind: PolicyKind,
    tasks: Vec<Arc<Task>>,
    processor_count: usize,
    observer: O,
) -> Box<dyn RealTimeScheduler>
where
    O: SchedulerObserver + Send + Debug + 'static,
{
    match kind {
        PolicyKind::Dbp => Box::new(
            MkScheduler::new(MkDbp::new(), processor_count)
                .with_tasks(tasks)
                .with_observer(observer),
        ),
        PolicyKind::Edf => Box::new(
            MkScheduler::new(MkEdf, processor_count)
                .with_tasks(tasks)
                .with_observer(observer),
        ),
        PolicyKind::Rms => Box::new(
            MkScheduler::new(MkRms, processor_count)
                .with_tasks(tasks)
                .with_observer(observer),
        ),
    }
}
