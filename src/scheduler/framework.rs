//! Shared ready-list / processor-selection / preemption framework.
//!
//! # Algorithm
//!
//! On every scheduling opportunity:
//! 1. Pick the target processor: idle before busy; among busy ones, the
//!    one whose running job has the highest eviction key; remaining ties
//!    go to the requesting processor.
//! 2. Pick the ready job with the lowest priority key (first activated
//!    wins on equal keys).
//! 3. Dispatch only if the target is idle, or the candidate is strictly
//!    more urgent than the running job and is not optional work displacing
//!    mandatory work.
//! 4. A displaced job goes back to the ready list.
//!
//! # Complexity
//! O(r + p) key evaluations per call, r = ready jobs, p = processors.

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::debug;

use super::{Dispatch, FirmnessKpi, RealTimeScheduler};
use crate::dispatching::PriorityPolicy;
use crate::models::{Job, JobState, Processor, ProcessorId, Task};
use crate::observer::{NoopObserver, SchedulerObserver};

/// An (m,k)-firm scheduler: the shared framework driven by policy `P`.
///
/// Callbacks must be invoked one at a time; each call observes the state
/// left by the previous one.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use u_mkfirm::dispatching::rules::MkRms;
/// use u_mkfirm::models::{Job, ProcessorId, Task};
/// use u_mkfirm::scheduler::{MkScheduler, RealTimeScheduler};
///
/// let fast = Arc::new(Task::new(1, 10));
/// let slow = Arc::new(Task::new(2, 20));
/// let mut scheduler = MkScheduler::new(MkRms, 1).with_tasks(vec![fast.clone(), slow.clone()]);
/// scheduler.init();
///
/// scheduler.on_activate(Job::activate(1, &slow, 0));
/// scheduler.on_activate(Job::activate(2, &fast, 0));
///
/// let dispatch = scheduler.schedule(ProcessorId(0)).expect("idle processor");
/// assert_eq!(dispatch.job.task_id(), fast.id);
/// ```
#[derive(Debug)]
pub struct MkScheduler<P, O = NoopObserver> {
    policy: P,
    observer: O,
    tasks: Vec<Arc<Task>>,
    processors: Vec<Processor>,
    ready: Vec<Job>,
    kpi: FirmnessKpi,
}

impl<P: PriorityPolicy> MkScheduler<P> {
    /// Creates a scheduler over `processor_count` processors (at least one).
    pub fn new(policy: P, processor_count: usize) -> Self {
        Self {
            policy,
            observer: NoopObserver,
            tasks: Vec::new(),
            processors: (0..processor_count.max(1)).map(Processor::new).collect(),
            ready: Vec::new(),
            kpi: FirmnessKpi::new(),
        }
    }
}

impl<P: PriorityPolicy, O: SchedulerObserver> MkScheduler<P, O> {
    /// Replaces the decision observer.
    pub fn with_observer<O2: SchedulerObserver>(self, observer: O2) -> MkScheduler<P, O2> {
        MkScheduler {
            policy: self.policy,
            observer,
            tasks: self.tasks,
            processors: self.processors,
            ready: self.ready,
            kpi: self.kpi,
        }
    }

    /// Sets the task set handed to the policy at [`init`](RealTimeScheduler::init).
    pub fn with_tasks(mut self, tasks: Vec<Arc<Task>>) -> Self {
        self.tasks = tasks;
        self
    }

    /// The active policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Mutable access to the active policy.
    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    /// The decision observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// The configured task set.
    pub fn tasks(&self) -> &[Arc<Task>] {
        &self.tasks
    }

    /// A processor by id.
    pub fn processor(&self, id: ProcessorId) -> Option<&Processor> {
        self.processors.get(id.0)
    }

    fn select_processor(&mut self, requesting: ProcessorId) -> Option<ProcessorId> {
        let policy = &mut self.policy;
        self.processors
            .iter()
            .min_by_key(|cpu| {
                let eviction = cpu.running().map(|job| Reverse(policy.eviction_key(job)));
                (eviction.is_some(), eviction, cpu.id != requesting)
            })
            .map(|cpu| cpu.id)
    }

    fn select_candidate(&mut self) -> Option<usize> {
        let policy = &mut self.policy;
        self.ready
            .iter()
            .enumerate()
            .min_by_key(|(_, job)| policy.priority_key(job))
            .map(|(index, _)| index)
    }

    fn designated(&self, cpu: ProcessorId) -> ProcessorId {
        if cpu.0 < self.processors.len() {
            cpu
        } else {
            ProcessorId(0)
        }
    }
}

/// Whether `candidate` may take a processor currently running `running`.
///
/// An idle processor always admits. Otherwise the candidate must be
/// strictly more urgent under `policy`, and optional work never displaces
/// mandatory work.
pub fn preemption_allowed<P: PriorityPolicy>(
    policy: &mut P,
    candidate: &Job,
    running: Option<&Job>,
) -> bool {
    let Some(running) = running else {
        return true;
    };
    if running.is_mandatory() && candidate.is_optional() {
        return false;
    }
    policy.priority_key(candidate) < policy.priority_key(running)
}

impl<P, O> RealTimeScheduler for MkScheduler<P, O>
where
    P: PriorityPolicy,
    O: SchedulerObserver + Send + std::fmt::Debug,
{
    fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    fn init(&mut self) {
        self.ready.clear();
        self.policy.init(&self.tasks);
        debug!(
            policy = self.policy.name(),
            tasks = self.tasks.len(),
            processors = self.processors.len(),
            "scheduler initialized"
        );
    }

    fn on_activate(&mut self, mut job: Job) -> ProcessorId {
        job.state = JobState::Ready;
        let resched = self.designated(job.cpu);
        debug!(job = %job, deadline = job.absolute_deadline, processor = %resched, "activate");

        match self.ready.iter_mut().find(|ready| ready.id == job.id) {
            Some(slot) => *slot = job,
            None => self.ready.push(job),
        }
        resched
    }

    fn on_terminated(&mut self, job: &Job) -> Option<ProcessorId> {
        self.policy.record_outcome(job);
        self.kpi.record(&job.task, job.met_deadline());

        if let Some(index) = self.ready.iter().position(|ready| ready.id == job.id) {
            self.ready.remove(index);
            debug!(job = %job, met = job.met_deadline(), "terminated while ready");
            return None;
        }

        let freed = self
            .processors
            .iter_mut()
            .find(|cpu| cpu.running().is_some_and(|running| running.id == job.id))
            .map(|cpu| {
                cpu.release();
                cpu.id
            });
        let resched = freed.unwrap_or_else(|| self.designated(job.cpu));
        debug!(job = %job, met = job.met_deadline(), processor = %resched, "terminated");
        Some(resched)
    }

    fn schedule(&mut self, requesting: ProcessorId) -> Option<Dispatch> {
        if self.ready.is_empty() {
            return None;
        }

        let target = self.select_processor(requesting)?;
        let index = self.select_candidate()?;

        let running = self.processors[target.0].running();
        if !preemption_allowed(&mut self.policy, &self.ready[index], running) {
            self.observer
                .on_decline(self.policy.name(), &self.ready[index], target);
            return None;
        }

        let mut job = self.ready.remove(index);
        job.state = JobState::Running;
        let preempted = self.processors[target.0].start(job.clone()).map(|mut old| {
            old.state = JobState::Ready;
            self.ready.push(old.clone());
            old
        });

        if let Some(old) = &preempted {
            debug!(job = %job, preempted = %old, processor = %target, "preempt");
        }

        let dispatch = Dispatch {
            job,
            processor: target,
            preempted,
        };
        self.observer.on_dispatch(self.policy.name(), &dispatch);
        Some(dispatch)
    }

    fn ready_jobs(&self) -> &[Job] {
        &self.ready
    }

    fn processors(&self) -> &[Processor] {
        &self.processors
    }

    fn kpi(&self) -> &FirmnessKpi {
        &self.kpi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules::{MkDbp, MkEdf, MkRms};
    use crate::models::{JobId, Outcome};
    use crate::observer::{Decision, RecordingObserver};
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn task(id: u32, period: i64) -> Arc<Task> {
        Arc::new(Task::new(id, period))
    }

    fn job(id: u64, task: &Arc<Task>, deadline: i64) -> Job {
        Job::activate(id, task, 0).with_absolute_deadline(deadline)
    }

    fn started<P: PriorityPolicy>(policy: P, cpus: usize) -> MkScheduler<P, RecordingObserver> {
        let mut scheduler = MkScheduler::new(policy, cpus).with_observer(RecordingObserver::new());
        scheduler.init();
        scheduler
    }

    #[test]
    fn test_empty_ready_list_no_decision() {
        let mut scheduler = started(MkEdf, 1);
        assert!(scheduler.schedule(ProcessorId(0)).is_none());
        assert!(scheduler.observer().decisions.is_empty());
    }

    #[test]
    fn test_dbp_mandatory_before_optional_at_equal_distance() {
        let t1 = task(1, 10);
        let t2 = task(2, 10);
        let mut scheduler = started(MkDbp::new(), 1);
        assert_eq!(scheduler.policy_mut().distance(&t1), crate::history::Distance::Finite(0));
        assert_eq!(scheduler.policy_mut().distance(&t2), crate::history::Distance::Finite(0));

        scheduler.on_activate(job(1, &t1, 5).optional());
        scheduler.on_activate(job(2, &t2, 50));

        let dispatch = scheduler.schedule(ProcessorId(0)).expect("idle");
        assert_eq!(dispatch.job.id, JobId(2));
        assert_eq!(scheduler.ready_jobs().len(), 1);
    }

    #[test]
    fn test_rms_shorter_period_dispatched() {
        let slow = task(1, 20);
        let fast = task(2, 10);
        let mut scheduler = started(MkRms, 1);
        scheduler.on_activate(job(1, &slow, 20));
        scheduler.on_activate(job(2, &fast, 10));

        let dispatch = scheduler.schedule(ProcessorId(0)).expect("idle");
        assert_eq!(dispatch.job.task_id(), fast.id);
        assert_eq!(dispatch.job.state, JobState::Running);
        assert_eq!(
            scheduler.processor(ProcessorId(0)).and_then(|cpu| cpu.running()).map(|j| j.id),
            Some(JobId(2))
        );
    }

    #[test]
    fn test_edf_optional_never_preempts_mandatory() {
        let t1 = task(1, 100);
        let t2 = task(2, 100);
        let mut scheduler = started(MkEdf, 1);
        scheduler.on_activate(job(1, &t1, 100));
        scheduler.schedule(ProcessorId(0)).expect("idle");

        scheduler.on_activate(job(2, &t2, 50).optional());
        assert!(scheduler.schedule(ProcessorId(0)).is_none());
        assert_eq!(scheduler.ready_jobs().len(), 1);
        assert_eq!(
            scheduler.observer().decisions.last(),
            Some(&Decision::Declined {
                job: JobId(2),
                processor: ProcessorId(0)
            })
        );
    }

    #[test]
    fn test_edf_earlier_deadline_preempts() {
        let t1 = task(1, 100);
        let t2 = task(2, 100);
        let mut scheduler = started(MkEdf, 1);
        scheduler.on_activate(job(1, &t1, 100));
        scheduler.schedule(ProcessorId(0)).expect("idle");

        scheduler.on_activate(job(2, &t2, 50));
        let dispatch = scheduler.schedule(ProcessorId(0)).expect("preempt");
        assert_eq!(dispatch.job.id, JobId(2));
        let preempted = dispatch.preempted.expect("displaced job");
        assert_eq!(preempted.id, JobId(1));
        assert_eq!(preempted.state, JobState::Ready);

        let ready: Vec<JobId> = scheduler.ready_jobs().iter().map(|j| j.id).collect();
        assert_eq!(ready, vec![JobId(1)]);
    }

    #[test]
    fn test_equal_urgency_does_not_preempt() {
        let t1 = task(1, 10);
        let mut scheduler = started(MkRms, 1);
        scheduler.on_activate(job(1, &t1, 10));
        scheduler.schedule(ProcessorId(0)).expect("idle");

        scheduler.on_activate(job(2, &t1, 20));
        assert!(scheduler.schedule(ProcessorId(0)).is_none());
    }

    #[test]
    fn test_mandatory_preempts_optional() {
        let t1 = task(1, 10);
        let t2 = task(2, 50);
        let mut scheduler = started(MkRms, 1);
        scheduler.on_activate(job(1, &t1, 10).optional());
        scheduler.schedule(ProcessorId(0)).expect("idle");

        scheduler.on_activate(job(2, &t2, 50));
        let dispatch = scheduler.schedule(ProcessorId(0)).expect("mandatory wins");
        assert_eq!(dispatch.job.id, JobId(2));
    }

    #[test]
    fn test_terminated_while_ready_is_removed() {
        let t1 = task(1, 10);
        let mut scheduler = started(MkEdf, 1);
        let pending = job(1, &t1, 10);
        scheduler.on_activate(pending.clone());

        let resched = scheduler.on_terminated(&pending.finish(Outcome::Missed));
        assert_eq!(resched, None);
        assert!(scheduler.ready_jobs().is_empty());
        assert_eq!(scheduler.kpi().missed(), 1);
    }

    #[test]
    fn test_terminated_running_frees_processor() {
        let t1 = task(1, 10);
        let mut scheduler = started(MkEdf, 2);
        scheduler.on_activate(job(1, &t1, 10).on_processor(1));
        let dispatch = scheduler.schedule(ProcessorId(1)).expect("idle");
        assert_eq!(dispatch.processor, ProcessorId(1));

        let resched = scheduler.on_terminated(&dispatch.job.finish(Outcome::Met));
        assert_eq!(resched, Some(ProcessorId(1)));
        assert!(scheduler.processors().iter().all(Processor::is_idle));
        assert_eq!(scheduler.kpi().completed(), 1);
    }

    #[test]
    fn test_unknown_job_termination_requests_designated_processor() {
        let t1 = task(1, 10);
        let mut scheduler = started(MkRms, 2);
        let stray = job(9, &t1, 10).on_processor(1);
        assert_eq!(scheduler.on_terminated(&stray), Some(ProcessorId(1)));
    }

    #[test]
    fn test_activate_returns_designated_processor() {
        let t1 = task(1, 10);
        let mut scheduler = started(MkRms, 2);
        assert_eq!(scheduler.on_activate(job(1, &t1, 10).on_processor(1)), ProcessorId(1));
        assert_eq!(scheduler.on_activate(job(2, &t1, 10).on_processor(7)), ProcessorId(0));
    }

    #[test]
    fn test_reactivation_keeps_job_unique() {
        let t1 = task(1, 10);
        let mut scheduler = started(MkEdf, 1);
        scheduler.on_activate(job(1, &t1, 10));
        scheduler.on_activate(job(1, &t1, 30));
        assert_eq!(scheduler.ready_jobs().len(), 1);
        assert_eq!(scheduler.ready_jobs()[0].absolute_deadline, 30);
    }

    #[test]
    fn test_idle_processor_preferred_over_requesting_busy() {
        let t1 = task(1, 10);
        let t2 = task(2, 10);
        let mut scheduler = started(MkEdf, 2);
        scheduler.on_activate(job(1, &t1, 10));
        let first = scheduler.schedule(ProcessorId(0)).expect("idle");
        assert_eq!(first.processor, ProcessorId(0));

        scheduler.on_activate(job(2, &t2, 5));
        let second = scheduler.schedule(ProcessorId(0)).expect("idle cpu1");
        assert_eq!(second.processor, ProcessorId(1));
        assert!(second.preempted.is_none());
    }

    #[test]
    fn test_busy_processor_with_latest_deadline_is_target() {
        let t = task(1, 100);
        let mut scheduler = started(MkEdf, 2);
        scheduler.on_activate(job(1, &t, 40));
        scheduler.schedule(ProcessorId(0)).expect("cpu0");
        scheduler.on_activate(job(2, &t, 90));
        scheduler.schedule(ProcessorId(1)).expect("cpu1");

        scheduler.on_activate(job(3, &t, 10));
        let dispatch = scheduler.schedule(ProcessorId(0)).expect("preempt");
        assert_eq!(dispatch.processor, ProcessorId(1));
        assert_eq!(dispatch.preempted.map(|j| j.id), Some(JobId(2)));
    }

    #[test]
    fn test_busy_tie_goes_to_requesting_processor() {
        let t = task(1, 100);
        let mut scheduler = started(MkRms, 2);
        scheduler.on_activate(job(1, &t, 100));
        scheduler.schedule(ProcessorId(0)).expect("cpu0");
        scheduler.on_activate(job(2, &t, 100));
        scheduler.schedule(ProcessorId(1)).expect("cpu1");

        let urgent = task(2, 5);
        scheduler.on_activate(job(3, &urgent, 5));
        let dispatch = scheduler.schedule(ProcessorId(1)).expect("preempt");
        assert_eq!(dispatch.processor, ProcessorId(1));
    }

    #[test]
    fn test_same_instant_calls_see_prior_mutations() {
        let t1 = task(1, 10);
        let t2 = task(2, 20);
        let mut scheduler = started(MkRms, 2);
        scheduler.on_activate(job(1, &t1, 10));
        scheduler.on_activate(job(2, &t2, 20));

        let a = scheduler.schedule(ProcessorId(0)).expect("cpu0");
        let b = scheduler.schedule(ProcessorId(1)).expect("cpu1");
        assert_eq!(a.job.id, JobId(1));
        assert_eq!(b.job.id, JobId(2));
        assert_ne!(a.processor, b.processor);
        assert!(scheduler.schedule(ProcessorId(0)).is_none());
    }

    #[test]
    fn test_dbp_history_changes_priority() {
        // Both (1,2); the task that just missed becomes most urgent.
        let t1 = Arc::new(Task::new(1, 10).with_firmness(1, 2));
        let t2 = Arc::new(Task::new(2, 20).with_firmness(1, 2));
        let mut scheduler =
            MkScheduler::new(MkDbp::new(), 1).with_tasks(vec![t1.clone(), t2.clone()]);
        scheduler.init();
        assert_eq!(scheduler.policy().histories().len(), 2);

        scheduler.on_activate(job(1, &t2, 20));
        scheduler.on_terminated(&job(1, &t2, 20).finish(Outcome::Missed));

        scheduler.on_activate(job(2, &t1, 10));
        scheduler.on_activate(job(3, &t2, 40));
        let dispatch = scheduler.schedule(ProcessorId(0)).expect("idle");
        assert_eq!(dispatch.job.id, JobId(3));
    }

    #[test]
    fn test_init_clears_ready_list() {
        let t1 = task(1, 10);
        let mut scheduler = started(MkEdf, 1);
        scheduler.on_activate(job(1, &t1, 10));
        scheduler.init();
        assert!(scheduler.ready_jobs().is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Activate { task: usize, optional: bool },
        Terminate { missed: bool },
        Schedule { cpu: usize },
    }

    fn random_ops(seed: u64, len: usize) -> Vec<Op> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..len)
            .map(|_| match rng.random_range(0..3) {
                0 => Op::Activate {
                    task: rng.random_range(0..4),
                    optional: rng.random_bool(0.3),
                },
                1 => Op::Terminate {
                    missed: rng.random_bool(0.4),
                },
                _ => Op::Schedule {
                    cpu: rng.random_range(0..2),
                },
            })
            .collect()
    }

    fn replay<P: PriorityPolicy>(policy: P, ops: &[Op]) -> Vec<Decision> {
        let tasks: Vec<Arc<Task>> = (0..4)
            .map(|i| {
                Arc::new(
                    Task::new(i, 10 * (i as i64 + 1))
                        .with_firmness(i as i64 % 3, 3)
                        .with_initial_sequence("101"),
                )
            })
            .collect();
        let mut scheduler = MkScheduler::new(policy, 2)
            .with_tasks(tasks.clone())
            .with_observer(RecordingObserver::new());
        scheduler.init();

        let mut next_id = 0u64;
        let mut now = 0i64;
        for op in ops {
            now += 1;
            match op {
                Op::Activate { task, optional } => {
                    next_id += 1;
                    let mut job = Job::activate(next_id, &tasks[*task], now);
                    if *optional {
                        job = job.optional();
                    }
                    scheduler.on_activate(job);
                }
                Op::Terminate { missed } => {
                    let victim = scheduler
                        .processors()
                        .iter()
                        .find_map(|cpu| cpu.running().cloned())
                        .or_else(|| scheduler.ready_jobs().first().cloned());
                    if let Some(job) = victim {
                        let outcome = if *missed { Outcome::Missed } else { Outcome::Met };
                        scheduler.on_terminated(&job.finish(outcome));
                    }
                }
                Op::Schedule { cpu } => {
                    scheduler.schedule(ProcessorId(*cpu));
                }
            }
        }
        scheduler.observer().decisions.clone()
    }

    #[test]
    fn test_replay_is_deterministic() {
        for seed in 0..8 {
            let ops = random_ops(seed, 200);
            assert_eq!(replay(MkDbp::new(), &ops), replay(MkDbp::new(), &ops));
            assert_eq!(replay(MkEdf, &ops), replay(MkEdf, &ops));
            assert_eq!(replay(MkRms, &ops), replay(MkRms, &ops));
        }
    }

    fn assert_mandatory_supremacy<P: PriorityPolicy>(
        policy: P,
        running_period: i64,
        running_deadline: i64,
        candidates: &[(i64, i64)],
    ) -> Result<(), TestCaseError> {
        let mut scheduler = MkScheduler::new(policy, 1);
        scheduler.init();
        let running_task = Arc::new(Task::new(0, running_period).with_firmness(3, 3));
        scheduler.on_activate(job(0, &running_task, running_deadline));
        prop_assert!(scheduler.schedule(ProcessorId(0)).is_some());

        for (i, (period, deadline)) in candidates.iter().enumerate() {
            let t = Arc::new(
                Task::new(i as u32 + 1, *period)
                    .with_firmness(1, 1)
                    .with_initial_sequence("0"),
            );
            scheduler.on_activate(job(i as u64 + 1, &t, *deadline).optional());
        }
        prop_assert!(scheduler.schedule(ProcessorId(0)).is_none());
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_optional_never_preempts_mandatory(
            running_period in 1i64..1000,
            running_deadline in 1i64..1000,
            candidates in proptest::collection::vec((1i64..1000, 1i64..1000), 1..6),
        ) {
            assert_mandatory_supremacy(MkDbp::new(), running_period, running_deadline, &candidates)?;
            assert_mandatory_supremacy(MkEdf, running_period, running_deadline, &candidates)?;
            assert_mandatory_supremacy(MkRms, running_period, running_deadline, &candidates)?;
        }
    }
}
