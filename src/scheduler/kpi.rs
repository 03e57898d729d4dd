//! (m,k)-firm quality metrics.
//!
//! Tracks job outcomes per task independently of the active policy.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Miss Ratio | Missed jobs / completed jobs |
//! | Dynamic Failure | A termination after which the last-k window holds fewer than m successes |
//! | Dynamic Failure Ratio | Dynamic failures / completed jobs |
//!
//! # Reference
//! Hamdaoui & Ramanathan (1995), "A Dynamic Priority Assignment Technique
//! for Streams with (m,k)-Firm Deadlines", §2 (probability of dynamic failure)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::history::History;
use crate::models::{Task, TaskId};

/// Outcome counters for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFirmnessStats {
    /// Jobs terminated.
    pub completed: usize,
    /// Jobs that met their deadline.
    pub met: usize,
    /// Jobs that missed their deadline.
    pub missed: usize,
    /// Terminations that left the (m,k) contract violated.
    pub dynamic_failures: usize,
    window: History,
}

impl TaskFirmnessStats {
    fn for_task(task: &Task) -> Self {
        Self {
            completed: 0,
            met: 0,
            missed: 0,
            dynamic_failures: 0,
            window: History::for_task(task),
        }
    }

    /// Fraction of completed jobs that missed (0.0 when nothing completed).
    pub fn miss_ratio(&self) -> f64 {
        if self.completed == 0 {
            0.0
        } else {
            self.missed as f64 / self.completed as f64
        }
    }
}

/// Per-task (m,k) statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirmnessKpi {
    by_task: BTreeMap<TaskId, TaskFirmnessStats>,
}

impl FirmnessKpi {
    /// Creates empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one job termination of `task`.
    pub fn record(&mut self, task: &Task, met_deadline: bool) {
        let stats = self
            .by_task
            .entry(task.id)
            .or_insert_with(|| TaskFirmnessStats::for_task(task));

        stats.completed += 1;
        if met_deadline {
            stats.met += 1;
        } else {
            stats.missed += 1;
        }

        stats.window.push(met_deadline);
        if task.firmness.is_constrained() && (stats.window.successes() as i64) < task.firmness.m {
            stats.dynamic_failures += 1;
        }
    }

    /// Statistics for one task.
    pub fn task(&self, id: TaskId) -> Option<&TaskFirmnessStats> {
        self.by_task.get(&id)
    }

    /// Statistics of every task that completed at least one job.
    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &TaskFirmnessStats)> {
        self.by_task.iter().map(|(id, stats)| (*id, stats))
    }

    /// Total jobs terminated.
    pub fn completed(&self) -> usize {
        self.by_task.values().map(|s| s.completed).sum()
    }

    /// Total deadline misses.
    pub fn missed(&self) -> usize {
        self.by_task.values().map(|s| s.missed).sum()
    }

    /// Total dynamic failures.
    pub fn dynamic_failures(&self) -> usize {
        self.by_task.values().map(|s| s.dynamic_failures).sum()
    }

    /// Overall miss ratio (0.0 when nothing completed).
    pub fn miss_ratio(&self) -> f64 {
        ratio(self.missed(), self.completed())
    }

    /// Overall dynamic failure ratio (0.0 when nothing completed).
    pub fn dynamic_failure_ratio(&self) -> f64 {
        ratio(self.dynamic_failures(), self.completed())
    }

    /// Whether no task ever violated its contract.
    pub fn all_contracts_held(&self) -> bool {
        self.dynamic_failures() == 0
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
