//! Per-task history store.

use std::collections::BTreeMap;

use super::{distance, Distance, History};
use crate::models::{Task, TaskId};

/// Outcome histories keyed by task identity.
///
/// Histories are normally built up front with [`HistoryTracker::init_task`];
/// a task first seen later is initialized on first access.
#[derive(Debug, Clone, Default)]
pub struct HistoryTracker {
    histories: BTreeMap<TaskId, History>,
}

impl HistoryTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)builds the history of `task` from its configuration.
    pub fn init_task(&mut self, task: &Task) {
        self.histories.insert(task.id, History::for_task(task));
    }

    /// Returns the history of `task`, building it if absent.
    pub fn get_or_init(&mut self, task: &Task) -> &mut History {
        self.histories
            .entry(task.id)
            .or_insert_with(|| History::for_task(task))
    }

    /// Records one job termination of `task`.
    pub fn record_outcome(&mut self, task: &Task, met_deadline: bool) {
        self.get_or_init(task).push(met_deadline);
    }

    /// Current distance of `task`.
    pub fn distance(&mut self, task: &Task) -> Distance {
        let firmness = task.firmness;
        distance(self.get_or_init(task), &firmness)
    }

    /// History of a task, if it has been initialized.
    pub fn get(&self, id: TaskId) -> Option<&History> {
        self.histories.get(&id)
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    /// Whether no task is tracked.
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}
