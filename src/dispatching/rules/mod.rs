//! Built-in (m,k)-firm priority policies.
//!
//! | Policy | Priority key (ascending) | Eviction key |
//! |--------|--------------------------|--------------|
//! | `MkEdf` | (optional, absolute deadline, period) | absolute deadline |
//! | `MkRms` | (optional, period) | period |
//! | `MkDbp` | (optional, distance, absolute deadline, period) | distance |
//!
//! All policies place mandatory jobs before optional ones.

mod dbp;

pub use dbp::MkDbp;

use super::PriorityPolicy;
use crate::models::Job;

/// Earliest absolute deadline first, mandatory before optional.
///
/// Ties on deadline are broken by shorter period.
#[derive(Debug, Clone, Copy, Default)]
pub struct MkEdf;

impl PriorityPolicy for MkEdf {
    type Key = (bool, i64, i64);
    type Eviction = i64;

    fn name(&self) -> &'static str {
        "MK_EDF"
    }

    fn priority_key(&mut self, job: &Job) -> Self::Key {
        (job.is_optional(), job.absolute_deadline, job.period())
    }

    fn eviction_key(&mut self, running: &Job) -> Self::Eviction {
        running.absolute_deadline
    }

    fn description(&self) -> &'static str {
        "Earliest Deadline First with (m,k)-firm criticality"
    }
}

/// Shortest period first (rate monotonic), mandatory before optional.
///
/// Deadlines are not compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct MkRms;

impl PriorityPolicy for MkRms {
    type Key = (bool, i64);
    type Eviction = i64;

    fn name(&self) -> &'static str {
        "MK_RMS"
    }

    fn priority_key(&mut self, job: &Job) -> Self::Key {
        (job.is_optional(), job.period())
    }

    fn eviction_key(&mut self, running: &Job) -> Self::Eviction {
        running.period()
    }

    fn description(&self) -> &'static str {
        "Rate Monotonic with (m,k)-firm criticality"
    }
}
