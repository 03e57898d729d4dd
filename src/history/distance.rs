//! Distance-to-failure metric for (m,k)-firm tasks.
//!
//! The distance of a task is the number of additional consecutive deadline
//! misses it can absorb before its last-k window holds fewer than `m`
//! successes. `0` means the next job must succeed; an unconstrained task
//! (`m <= 0`) has infinite distance.
//!
//! # Reference
//! Goossens (2008), "(m,k)-firm constraints and DBP scheduling: impact of
//! the initial k-sequence and exact schedulability test", RTNS 2008

use serde::{Deserialize, Serialize};
use std::fmt;

use super::History;
use crate::models::Firmness;

/// Tolerable consecutive misses. Orders `Finite(0) < Finite(1) < … < Infinite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Distance {
    /// At most this many further misses keep the contract.
    Finite(usize),
    /// No (m,k) requirement applies.
    Infinite,
}

impl Distance {
    /// Whether the task must succeed on its next job.
    pub fn is_critical(self) -> bool {
        self == Distance::Finite(0)
    }

    /// The finite value, if any.
    pub fn finite(self) -> Option<usize> {
        match self {
            Distance::Finite(d) => Some(d),
            Distance::Infinite => None,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(d) => write!(f, "{d}"),
            Distance::Infinite => f.write_str("inf"),
        }
    }
}

/// Computes the distance of a history under an (m,k) contract.
///
/// # Algorithm
/// 1. `m <= 0` → `Infinite`.
/// 2. Fewer than `m` successes in the window → `0` (already violated).
/// 3. Otherwise shift in hypothetical misses one at a time. At step `i`
///    the oldest remaining real outcome leaves the window; the first step
///    whose window drops below `m` successes yields `i - 1`. If none does
///    within `k` steps the result is `k`.
///
/// # Complexity
/// O(k): each step only subtracts the outcome that was shifted out.
pub fn distance(history: &History, firmness: &Firmness) -> Distance {
    if !firmness.is_constrained() {
        return Distance::Infinite;
    }
    let m = firmness.m as usize;

    let mut successes = history.successes();
    if successes < m {
        return Distance::Finite(0);
    }

    for (allowed, met) in history.iter().enumerate() {
        if met {
            successes -= 1;
        }
        if successes < m {
            return Distance::Finite(allowed);
        }
    }

    Distance::Finite(history.len())
}
