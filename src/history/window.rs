//! Fixed-length outcome window.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::seed::normalize_seed;
use crate::models::Task;

/// The last `k` job outcomes of a task, oldest first.
///
/// Once built, the window always holds exactly `capacity` entries:
/// every push evicts the oldest outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    window: VecDeque<bool>,
    capacity: usize,
}

impl History {
    /// Builds a window of length `max(1, k)` from a seed sequence.
    ///
    /// Keeps the last `k` seed entries and left-pads with successes, so
    /// a fresh task never starts in violation unless configured to.
    pub fn seeded(k: usize, seed: &[bool]) -> Self {
        let capacity = k.max(1);
        let start = seed.len().saturating_sub(capacity);
        let tail = &seed[start..];

        let mut window = VecDeque::with_capacity(capacity);
        window.extend(std::iter::repeat(true).take(capacity - tail.len()));
        window.extend(tail.iter().copied());

        Self { window, capacity }
    }

    /// Builds the initial history of a task from its (m,k) contract and
    /// configured seed.
    pub fn for_task(task: &Task) -> Self {
        let seed = normalize_seed(task.initial_sequence.as_ref());
        Self::seeded(task.firmness.window_len(), &seed)
    }

    /// Appends an outcome, evicting the oldest.
    pub fn push(&mut self, met_deadline: bool) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(met_deadline);
    }

    /// Number of met deadlines in the window.
    pub fn successes(&self) -> usize {
        self.window.iter().filter(|&&met| met).count()
    }

    /// Current length (equal to the capacity after construction).
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Whether the window is empty. Never true for a constructed history.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Window length `k`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Outcomes, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.window.iter().copied()
    }

    /// Snapshot as `0`/`1` values, oldest first.
    pub fn bits(&self) -> Vec<u8> {
        self.iter().map(u8::from).collect()
    }
}
